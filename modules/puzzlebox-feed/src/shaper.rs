//! Activity shaper: turns one stored event into its UI-ready form.
//!
//! Dispatch is an exhaustive match over `EventKind`. Unknown kinds get the
//! base shape (id, type, actor, timestamp, content) and nothing else.

use chrono::{DateTime, Utc};

use crate::format::{difficulty_bucket, format_solve_time, relative_time, solve_hours};
use crate::types::{
    ActivityActor, ActivityMetadata, ActivityPuzzle, ActivityStats, ActivityType, Event,
    EventKind, PuzzleSnapshot, ShapedActivity,
};

const UNKNOWN_ACTOR_NAME: &str = "Unknown user";
const LIST_ADD_DEFAULT_CONTENT: &str = "added a puzzle to their list";

/// Shape a single event. `now` is the shaping time used for the relative
/// timestamp. Engagement counts are left at zero for the assembler.
pub fn shape(event: &Event, now: DateTime<Utc>) -> ShapedActivity {
    let base = base_shape(event, now);

    match &event.kind {
        EventKind::Review => shape_review(event, base),
        EventKind::Solved => shape_completion(event, base),
        EventKind::Post => shape_post(event, base),
        // Legacy dual-purpose kind: before `post` existed, free-text posts
        // were written as progress updates. Any non-blank text means post;
        // otherwise it is a completion.
        EventKind::ProgressUpdate => {
            if has_text(event) {
                shape_post(event, base)
            } else {
                shape_completion(event, base)
            }
        }
        EventKind::ListAdd => shape_list_add(event, base),
        EventKind::Unknown(_) => base,
    }
}

/// Shape a page of events, preserving order.
pub fn shape_all(events: &[Event], now: DateTime<Utc>) -> Vec<ShapedActivity> {
    events.iter().map(|e| shape(e, now)).collect()
}

fn base_shape(event: &Event, now: DateTime<Utc>) -> ShapedActivity {
    let actor = match &event.actor {
        Some(actor) => ActivityActor {
            id: actor.internal_id,
            name: actor.display_name.clone(),
            avatar: actor.avatar_url.clone(),
        },
        None => ActivityActor {
            id: event.actor_id,
            name: UNKNOWN_ACTOR_NAME.to_string(),
            avatar: None,
        },
    };

    ShapedActivity {
        id: event.id,
        kind: ActivityType::Other(event.kind.as_str().to_string()),
        actor,
        timestamp: relative_time(event.created_at, now),
        content: event.text.clone().unwrap_or_default(),
        puzzle: None,
        stats: ActivityStats::default(),
        metadata: None,
        media_urls: None,
        created_at: event.created_at,
    }
}

fn shape_review(event: &Event, mut out: ShapedActivity) -> ShapedActivity {
    let rating = event.review.as_ref().map(|r| r.rating);

    out.kind = ActivityType::Review;
    out.puzzle = event
        .puzzle
        .as_ref()
        .map(|p| puzzle_view(p, difficulty_bucket(rating), rating));
    out.metadata = Some(ActivityMetadata {
        rating,
        ..Default::default()
    });
    out
}

fn shape_completion(event: &Event, mut out: ShapedActivity) -> ShapedActivity {
    let progress = event.progress.as_ref();
    let difficulty_rating = progress.and_then(|p| p.difficulty_rating);
    let user_rating = progress.and_then(|p| p.user_rating);
    let solve_seconds = progress.and_then(|p| p.solve_time_seconds);

    out.kind = ActivityType::Completion;
    out.puzzle = event
        .puzzle
        .as_ref()
        .map(|p| puzzle_view(p, difficulty_bucket(difficulty_rating), user_rating));
    out.stats.hours = solve_hours(solve_seconds);
    out.metadata = Some(ActivityMetadata {
        solve_time: solve_seconds.map(format_solve_time),
        progress: progress.and_then(|p| p.progress_percentage),
        status: progress.map(|p| p.status.clone()),
        user_rating,
        difficulty_rating,
        ..Default::default()
    });
    out
}

fn shape_post(event: &Event, mut out: ShapedActivity) -> ShapedActivity {
    out.kind = ActivityType::Post;
    out.media_urls = Some(event.media_urls.clone());
    out
}

fn shape_list_add(event: &Event, mut out: ShapedActivity) -> ShapedActivity {
    out.kind = ActivityType::Follow;
    if !has_text(event) {
        out.content = LIST_ADD_DEFAULT_CONTENT.to_string();
    }
    out.puzzle = event
        .puzzle
        .as_ref()
        .map(|p| puzzle_view(p, difficulty_bucket(None), None));
    out.metadata = event.targets.list_id.map(|list_id| ActivityMetadata {
        list_id: Some(list_id),
        ..Default::default()
    });
    out
}

fn puzzle_view(p: &PuzzleSnapshot, difficulty: &str, rating: Option<i32>) -> ActivityPuzzle {
    ActivityPuzzle {
        id: p.id,
        title: p.title.clone(),
        brand: p.brand_name.clone(),
        image: p.image_url.clone(),
        piece_count: p.piece_count,
        difficulty: difficulty.to_string(),
        rating,
    }
}

fn has_text(event: &Event) -> bool {
    event
        .text
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, EventTargets, ProgressSnapshot, ReviewSnapshot};
    use chrono::Duration;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn puzzle() -> PuzzleSnapshot {
        PuzzleSnapshot {
            id: Uuid::new_v4(),
            title: "Starry Night".to_string(),
            image_url: Some("https://img.example/starry.jpg".to_string()),
            piece_count: Some(1000),
            brand_name: Some("Ravensburger".to_string()),
        }
    }

    fn event(kind: EventKind) -> Event {
        let actor_id = Uuid::new_v4();
        Event {
            id: Uuid::new_v4(),
            kind,
            actor_id,
            targets: EventTargets::default(),
            text: None,
            media_urls: vec![],
            created_at: now() - Duration::minutes(5),
            actor: Some(Actor {
                internal_id: actor_id,
                external_id: Some("user_abc".to_string()),
                display_name: "Ada".to_string(),
                avatar_url: None,
            }),
            puzzle: None,
            review: None,
            progress: None,
        }
    }

    fn progress(percentage: Option<i32>) -> ProgressSnapshot {
        ProgressSnapshot {
            status: "completed".to_string(),
            solve_time_seconds: Some(3725),
            difficulty_rating: Some(3),
            user_rating: Some(5),
            progress_percentage: percentage,
        }
    }

    #[test]
    fn test_review_uses_review_rating_for_difficulty() {
        let mut e = event(EventKind::Review);
        e.text = Some("Lovely sky gradient".to_string());
        e.puzzle = Some(puzzle());
        e.review = Some(ReviewSnapshot {
            rating: 2,
            text: Some("Lovely sky gradient".to_string()),
        });

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind, ActivityType::Review);
        assert_eq!(shaped.content, "Lovely sky gradient");
        assert_eq!(shaped.timestamp, "5m ago");
        let p = shaped.puzzle.unwrap();
        assert_eq!(p.difficulty, "Easy");
        assert_eq!(p.rating, Some(2));
        assert_eq!(shaped.metadata.unwrap().rating, Some(2));
    }

    #[test]
    fn test_solved_becomes_completion() {
        let mut e = event(EventKind::Solved);
        e.puzzle = Some(puzzle());
        e.progress = Some(progress(Some(100)));

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind, ActivityType::Completion);
        assert_eq!(shaped.stats.hours, 1);
        assert_eq!(shaped.puzzle.as_ref().unwrap().difficulty, "Medium");
        let meta = shaped.metadata.unwrap();
        assert_eq!(meta.solve_time.as_deref(), Some("1h 2m"));
        assert_eq!(meta.progress, Some(100));
        assert!(shaped.media_urls.is_none());
    }

    #[test]
    fn test_solved_without_progress_snapshot() {
        let mut e = event(EventKind::Solved);
        e.puzzle = Some(puzzle());

        let shaped = shape(&e, now());
        assert_eq!(shaped.stats.hours, 0);
        assert_eq!(shaped.puzzle.unwrap().difficulty, "Unknown");
        assert!(shaped.metadata.unwrap().solve_time.is_none());
    }

    #[test]
    fn test_post_passes_media_through() {
        let mut e = event(EventKind::Post);
        e.text = Some("Sorting edges tonight".to_string());
        e.media_urls = vec!["https://img.example/b.jpg".into(), "https://img.example/a.jpg".into()];

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind, ActivityType::Post);
        assert_eq!(shaped.media_urls.as_deref(), Some(e.media_urls.as_slice()));
        assert!(shaped.puzzle.is_none());
        assert!(shaped.metadata.is_none());
    }

    #[test]
    fn test_progress_update_with_text_is_post() {
        let mut e = event(EventKind::ProgressUpdate);
        e.text = Some("Great puzzle!".to_string());
        e.puzzle = Some(puzzle());
        e.progress = Some(progress(Some(40)));

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind, ActivityType::Post);
        assert_eq!(shaped.content, "Great puzzle!");
        assert!(shaped.puzzle.is_none());
        assert!(shaped.metadata.is_none());
    }

    #[test]
    fn test_progress_update_without_text_is_completion() {
        let mut e = event(EventKind::ProgressUpdate);
        e.text = Some("".to_string());
        e.puzzle = Some(puzzle());
        e.progress = Some(progress(Some(40)));

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind, ActivityType::Completion);
        assert_eq!(shaped.metadata.unwrap().progress, Some(40));
        assert!(shaped.puzzle.is_some());
    }

    #[test]
    fn test_progress_update_whitespace_text_is_completion() {
        let mut e = event(EventKind::ProgressUpdate);
        e.text = Some("   \n".to_string());
        e.progress = Some(progress(Some(10)));

        assert_eq!(shape(&e, now()).kind, ActivityType::Completion);
    }

    #[test]
    fn test_list_add_renders_as_follow_with_default_content() {
        let list_id = Uuid::new_v4();
        let mut e = event(EventKind::ListAdd);
        e.targets.list_id = Some(list_id);

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind, ActivityType::Follow);
        assert_eq!(shaped.content, LIST_ADD_DEFAULT_CONTENT);
        assert_eq!(shaped.metadata.unwrap().list_id, Some(list_id));
    }

    #[test]
    fn test_unknown_kind_gets_base_shape_only() {
        let mut e = event(EventKind::Unknown("badge_earned".to_string()));
        e.text = Some("Earned a badge".to_string());
        e.puzzle = Some(puzzle());
        e.media_urls = vec!["https://img.example/badge.png".into()];

        let shaped = shape(&e, now());
        assert_eq!(shaped.kind.as_str(), "badge_earned");
        assert_eq!(shaped.content, "Earned a badge");
        assert!(shaped.puzzle.is_none());
        assert!(shaped.metadata.is_none());
        assert!(shaped.media_urls.is_none());
        assert_eq!(shaped.stats, ActivityStats::default());
    }

    #[test]
    fn test_missing_actor_falls_back() {
        let mut e = event(EventKind::Post);
        e.actor = None;

        let shaped = shape(&e, now());
        assert_eq!(shaped.actor.id, e.actor_id);
        assert_eq!(shaped.actor.name, UNKNOWN_ACTOR_NAME);
    }

    #[test]
    fn test_json_shape_of_completion() {
        let mut e = event(EventKind::Solved);
        e.puzzle = Some(puzzle());
        e.progress = Some(progress(None));

        let json = serde_json::to_value(shape(&e, now())).unwrap();
        assert_eq!(json["type"], "completion");
        assert_eq!(json["actor"]["name"], "Ada");
        assert_eq!(json["puzzle"]["pieceCount"], 1000);
        assert_eq!(json["puzzle"]["brand"], "Ravensburger");
        assert_eq!(json["metadata"]["solveTime"], "1h 2m");
        assert!(json["metadata"].get("progress").is_none());
        assert!(json.get("media_urls").is_none());
        assert!(json.get("created_at").is_none());
    }
}
