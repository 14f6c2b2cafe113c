//! Restricted preview projection.
//!
//! Same node shape as the full tree, but playable URLs exist only on
//! free-preview videos; everything else becomes a locked placeholder. Pure
//! function over an already-built tree, so the no-leak property is testable
//! without a database.

use super::tree::CourseTree;

/// Project a full tree into its preview form.
///
/// Card metadata and the month/day skeleton pass through unchanged. Video
/// nodes keep title, details, and thumbnail; `playback_url` is withheld and
/// `locked` set unless the video is flagged free-preview.
pub fn project(mut tree: CourseTree) -> CourseTree {
    for group in &mut tree.age_groups {
        for month in &mut group.months {
            for day in &mut month.days {
                for video in &mut day.videos {
                    if !video.is_free_preview {
                        video.playback_url = None;
                        video.locked = true;
                    }
                }
            }
        }
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tree::{AgeGroupNode, CardNode, DayNode, MonthNode, VideoNode};

    fn video(title: &str, free: bool) -> VideoNode {
        VideoNode {
            id: format!("video-{title}"),
            title: title.to_string(),
            details: Some("drill notes".to_string()),
            thumbnail_url: Some(format!("https://cdn.example/{title}.jpg")),
            playback_url: Some(format!("https://cdn.example/{title}.m3u8")),
            is_free_preview: free,
            locked: false,
        }
    }

    fn sample_tree() -> CourseTree {
        CourseTree {
            course_id: "course-1".to_string(),
            age_groups: vec![AgeGroupNode {
                id: "group-1".to_string(),
                title: "U12".to_string(),
                cards: vec![CardNode {
                    id: "card-1".to_string(),
                    title: "140-150cm".to_string(),
                    min_age: Some(10),
                    max_age: Some(12),
                    min_height_cm: Some(140),
                    max_height_cm: Some(150),
                    min_weight_kg: None,
                    max_weight_kg: None,
                }],
                months: vec![MonthNode {
                    id: "month-1".to_string(),
                    month_number: 1,
                    title: "Foundations".to_string(),
                    days: vec![DayNode {
                        id: "day-1".to_string(),
                        day_number: 1,
                        title: "Warmup".to_string(),
                        videos: vec![video("intro", true), video("drills", false)],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn non_preview_urls_are_withheld() {
        let projected = project(sample_tree());
        let videos = &projected.age_groups[0].months[0].days[0].videos;

        assert!(videos[0].is_free_preview);
        assert!(!videos[0].locked);
        assert!(videos[0].playback_url.is_some());

        assert!(!videos[1].is_free_preview);
        assert!(videos[1].locked);
        assert!(videos[1].playback_url.is_none());
    }

    #[test]
    fn locked_placeholders_keep_display_metadata() {
        let projected = project(sample_tree());
        let locked = &projected.age_groups[0].months[0].days[0].videos[1];
        assert_eq!("drills", locked.title);
        assert!(locked.thumbnail_url.is_some());
        assert!(locked.details.is_some());
    }

    #[test]
    fn skeleton_and_card_metadata_pass_through() {
        let projected = project(sample_tree());
        let group = &projected.age_groups[0];
        assert_eq!("U12", group.title);
        assert_eq!(1, group.cards.len());
        assert_eq!(Some(140), group.cards[0].min_height_cm);
        assert_eq!(1, group.months[0].days[0].day_number);
    }

    #[test]
    fn no_playable_url_survives_for_locked_videos() {
        let projected = project(sample_tree());
        let json = serde_json::to_string(&projected).unwrap();
        assert!(!json.contains("drills.m3u8"));
        assert!(json.contains("intro.m3u8"));
    }
}
