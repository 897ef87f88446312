//! Database tests covering the transactional paths: like toggling,
//! notification fan-out, and the explicit cascade deletes. Each test gets a
//! fresh database with the migrations applied.

use sqlx::PgPool;

use curhat::auth::repo::{delete_user_cascade_tx, User};
use curhat::comments;
use curhat::error::ApiError;
use curhat::likes;
use curhat::notifications;
use curhat::state::AppState;
use curhat::stories;

async fn make_user(db: &PgPool, username: &str) -> User {
    User::create(db, username, &format!("{username}@example.com"), "hash")
        .await
        .unwrap()
}

async fn count(db: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db)
        .await
        .unwrap()
}

#[sqlx::test]
async fn toggling_a_like_twice_restores_the_count(pool: PgPool) {
    let state = AppState::fake_with_db(pool.clone());
    let bob = make_user(&pool, "bob").await;
    let alice = make_user(&pool, "alice").await;
    let story = stories::repo::insert(&pool, bob.id, "a story", false, None)
        .await
        .unwrap();

    let first = likes::services::toggle_story_like(&state, alice.id, story.id)
        .await
        .unwrap();
    assert!(first.liked);
    assert_eq!(first.like_count, 1);

    let fanout = notifications::repo::list_for_user(&pool, bob.id)
        .await
        .unwrap();
    assert_eq!(fanout.len(), 1);
    assert_eq!(fanout[0].kind, "story_like");
    assert_eq!(fanout[0].story_id, Some(story.id));

    let second = likes::services::toggle_story_like(&state, alice.id, story.id)
        .await
        .unwrap();
    assert!(!second.liked);
    assert_eq!(second.like_count, 0);
    assert_eq!(count(&pool, "story_likes").await, 0);

    // Unliking leaves the earlier notification alone.
    let fanout = notifications::repo::list_for_user(&pool, bob.id)
        .await
        .unwrap();
    assert_eq!(fanout.len(), 1);
}

#[sqlx::test]
async fn liking_your_own_story_creates_no_notification(pool: PgPool) {
    let state = AppState::fake_with_db(pool.clone());
    let bob = make_user(&pool, "bob").await;
    let story = stories::repo::insert(&pool, bob.id, "my own story", false, None)
        .await
        .unwrap();

    let toggled = likes::services::toggle_story_like(&state, bob.id, story.id)
        .await
        .unwrap();
    assert!(toggled.liked);
    assert_eq!(toggled.like_count, 1);

    assert_eq!(count(&pool, "notifications").await, 0);
    assert_eq!(
        notifications::repo::count_unread(&pool, bob.id).await.unwrap(),
        0
    );
}

#[sqlx::test]
async fn deleting_a_story_removes_every_dependent_row(pool: PgPool) {
    let state = AppState::fake_with_db(pool.clone());
    let bob = make_user(&pool, "bob").await;
    let alice = make_user(&pool, "alice").await;
    let carol = make_user(&pool, "carol").await;
    let story = stories::repo::insert(&pool, bob.id, "a story", false, None)
        .await
        .unwrap();

    let top = comments::services::add_comment(&state, alice.id, story.id, "first", None)
        .await
        .unwrap();
    comments::services::add_comment(&state, carol.id, story.id, "a reply", Some(top.id))
        .await
        .unwrap();
    likes::services::toggle_story_like(&state, alice.id, story.id)
        .await
        .unwrap();
    likes::services::toggle_comment_like(&state, bob.id, top.id)
        .await
        .unwrap();

    // Comments, likes on story and comment, and fan-out all exist.
    assert_eq!(count(&pool, "comments").await, 2);
    assert_eq!(count(&pool, "story_likes").await, 1);
    assert_eq!(count(&pool, "comment_likes").await, 1);
    assert!(count(&pool, "notifications").await > 0);

    let mut tx = pool.begin().await.unwrap();
    stories::repo::delete_cascade_tx(&mut tx, story.id).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(count(&pool, "stories").await, 0);
    assert_eq!(count(&pool, "comments").await, 0);
    assert_eq!(count(&pool, "story_likes").await, 0);
    assert_eq!(count(&pool, "comment_likes").await, 0);
    assert_eq!(count(&pool, "notifications").await, 0);
}

#[sqlx::test]
async fn deleting_a_user_cascades_transitively(pool: PgPool) {
    let state = AppState::fake_with_db(pool.clone());
    let bob = make_user(&pool, "bob").await;
    let alice = make_user(&pool, "alice").await;
    let story = stories::repo::insert(&pool, bob.id, "bob's story", false, None)
        .await
        .unwrap();

    // Alice engages with bob's story; bob replies under her comment.
    let comment = comments::services::add_comment(&state, alice.id, story.id, "hi", None)
        .await
        .unwrap();
    comments::services::add_comment(&state, bob.id, story.id, "hello back", Some(comment.id))
        .await
        .unwrap();
    likes::services::toggle_story_like(&state, alice.id, story.id)
        .await
        .unwrap();
    likes::services::toggle_comment_like(&state, bob.id, comment.id)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    delete_user_cascade_tx(&mut tx, alice.id).await.unwrap();
    tx.commit().await.unwrap();

    assert!(User::find_by_id(&pool, alice.id).await.unwrap().is_none());
    assert!(User::find_by_id(&pool, bob.id).await.unwrap().is_some());

    // Her comment goes, and bob's reply under it goes with it.
    assert_eq!(count(&pool, "comments").await, 0);
    // Her story-like and bob's like on her comment both go.
    assert_eq!(count(&pool, "story_likes").await, 0);
    assert_eq!(count(&pool, "comment_likes").await, 0);

    // Bob's story survives untouched, as does the one notification that only
    // references the story (alice liked it); everything pointing at her
    // comment is gone, and so is her own inbox.
    assert_eq!(count(&pool, "stories").await, 1);
    let remaining = notifications::repo::list_for_user(&pool, bob.id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].kind, "story_like");
    assert_eq!(
        notifications::repo::list_for_user(&pool, alice.id)
            .await
            .unwrap()
            .len(),
        0
    );
}

#[sqlx::test]
async fn duplicate_registration_maps_to_conflict(pool: PgPool) {
    make_user(&pool, "alice").await;

    // Same username, different email: the losing insert of a
    // check-then-insert race trips the unique index.
    let err = User::create(&pool, "alice", "other@example.com", "hash")
        .await
        .unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));

    let err = User::create(&pool, "bob", "alice@example.com", "hash")
        .await
        .unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
}
