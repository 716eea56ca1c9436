//! Service-level integration tests against a migrated SQLite database.

mod common;

use std::sync::Arc;

use carhub::domain::{CarFilter, CarStatus, ForumPostInput, ListingScope};
use carhub::errors::AppError;
use carhub::services::ServiceContainer;
use carhub::types::PaginationParams;
use sea_orm::ConnectionTrait;

use common::{car_input, Harness};

#[tokio::test]
async fn test_inactive_listings_stay_hidden() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;

    let active = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;
    let pending = h.listing(&seller, &camry, 2021, 1_300_000, CarStatus::Moderation).await;
    let sold = h.listing(&seller, &camry, 2019, 900_000, CarStatus::Sold).await;

    let cars = h.services.cars();

    let listed = cars.list(CarFilter::default()).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|l| l.car.id).collect();
    assert_eq!(ids, vec![active.car.id]);

    let page = cars.browse(1).await.unwrap();
    assert_eq!(page.total, 1);

    for hidden in [pending.car.id, sold.car.id] {
        assert!(matches!(cars.detail(hidden).await, Err(AppError::NotFound)));
        assert!(matches!(cars.get(hidden).await, Err(AppError::NotFound)));
        assert!(matches!(cars.record_view(hidden).await, Err(AppError::NotFound)));
    }

    // The seller can still reach a pending listing for editing
    let editable = cars.find_for_edit(ListingScope::Any, seller.id, pending.car.id).await.unwrap();
    assert_eq!(editable.status, CarStatus::Moderation);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_views_are_all_counted() {
    let h = Harness::pooled(8).await;
    assert_eq!(h.config.database_max_connections, 8);
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let listing = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;

    let services = Arc::clone(&h.services);
    let tasks: Vec<_> = (0..25)
        .map(|_| {
            let services = Arc::clone(&services);
            let id = listing.car.id;
            tokio::spawn(async move { services.cars().record_view(id).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let detail = h.services.cars().detail(listing.car.id).await.unwrap();
    assert_eq!(detail.listing.car.views, 25);
}

#[tokio::test]
async fn test_duplicate_favorite_is_rejected() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let buyer = h.user("buyer").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let listing = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;

    let favorites = h.services.favorites();
    favorites.add(buyer.id, listing.car.id).await.unwrap();

    let again = favorites.add(buyer.id, listing.car.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(favorites.list_mine(buyer.id).await.unwrap().len(), 1);

    favorites.remove(buyer.id, listing.car.id).await.unwrap();
    assert!(favorites.list_mine(buyer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_referenced_catalog_entries_are_protected() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (toyota, camry) = h.catalog("Toyota", "Camry").await;
    let listing = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Moderation).await;

    let brand_delete = h.services.brands().delete(toyota.id).await;
    assert!(matches!(brand_delete, Err(AppError::Protected)));

    let model_delete = h.services.admin().delete_model(camry.id).await;
    assert!(matches!(model_delete, Err(AppError::Protected)));

    // Once the listing is gone the catalog can be cleaned up
    h.services.cars().delete(ListingScope::Any, seller.id, listing.car.id).await.unwrap();
    h.services.brands().delete(toyota.id).await.unwrap();
    assert!(matches!(
        h.services.admin().model(camry.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_deleting_creator_keeps_listing() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let manager = h.user("manager").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let listing = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;

    h.database
        .connection()
        .execute_unprepared(&format!(
            "UPDATE cars SET created_by = {} WHERE id = {}",
            manager.id, listing.car.id
        ))
        .await
        .unwrap();

    h.services.admin().delete_user(manager.id).await.unwrap();

    let detail = h.services.admin().car(listing.car.id).await.unwrap();
    assert_eq!(detail.listing.car.created_by, None);
    assert_eq!(detail.listing.car.seller_id, seller.id);
}

#[tokio::test]
async fn test_named_filters() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;

    let fresh = h.listing(&seller, &camry, 2024, 1_500_000, CarStatus::Active).await;
    let old = h.listing(&seller, &camry, 2010, 700_000, CarStatus::Active).await;
    let pricey = h.listing(&seller, &camry, 2022, 3_500_000, CarStatus::Active).await;

    let cars = h.services.cars();

    let cheap_new = cars
        .list(CarFilter {
            cheap_new_not_moderation: true,
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<i64> = cheap_new.iter().map(|l| l.car.id).collect();
    assert_eq!(ids, vec![fresh.car.id]);

    let mut old_or_expensive: Vec<i64> = cars
        .list(CarFilter {
            old_or_expensive_not_sold: true,
            ..Default::default()
        })
        .await
        .unwrap()
        .iter()
        .map(|l| l.car.id)
        .collect();
    old_or_expensive.sort();
    assert_eq!(old_or_expensive, vec![old.car.id, pricey.car.id]);

    let cheap = cars.cheap(CarFilter::default()).await.unwrap();
    let ids: Vec<i64> = cheap.iter().map(|l| l.car.id).collect();
    assert_eq!(ids, vec![old.car.id]);
}

#[tokio::test]
async fn test_search_matches_every_term() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let (_, x5) = h.catalog("BMW", "X5").await;

    let toyota = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;
    h.listing(&seller, &x5, 2020, 4_000_000, CarStatus::Active).await;

    let found = h
        .services
        .cars()
        .list(CarFilter {
            search: vec!["toyota".into(), "service".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].car.id, toyota.car.id);
}

#[tokio::test]
async fn test_only_seller_can_change_listing() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let stranger = h.user("stranger").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let listing = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;

    let cars = h.services.cars();
    let changed = car_input(&camry, 2020, 1_100_000, CarStatus::Sold);

    assert!(matches!(
        cars.update(ListingScope::Active, stranger.id, listing.car.id, changed.clone()).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        cars.delete(ListingScope::Active, stranger.id, listing.car.id).await,
        Err(AppError::Forbidden)
    ));

    let updated = cars.update(ListingScope::Active, seller.id, listing.car.id, changed).await.unwrap();
    assert_eq!(updated.car.price, 1_100_000);
    assert_eq!(updated.car.status, CarStatus::Sold);

    cars.delete(ListingScope::Any, seller.id, listing.car.id).await.unwrap();
    assert!(matches!(
        cars.find_for_edit(ListingScope::Any, seller.id, listing.car.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_forum_thread_and_cascade() {
    let h = Harness::new().await;
    let author = h.user("author").await;
    let replier = h.user("replier").await;
    let forum = h.services.forum();

    let topic = forum
        .create(
            author.id,
            ForumPostInput {
                title: "Winter tyres".into(),
                content: "Studded or not?".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    let reply = forum
        .create(
            replier.id,
            ForumPostInput {
                title: "Re: Winter tyres".into(),
                content: "Studded".into(),
                parent_id: Some(topic.id),
            },
        )
        .await
        .unwrap();
    forum
        .create(
            author.id,
            ForumPostInput {
                title: "Re: Re: Winter tyres".into(),
                content: "Thanks".into(),
                parent_id: Some(reply.id),
            },
        )
        .await
        .unwrap();

    let thread = forum.thread(topic.id).await.unwrap();
    assert_eq!(thread.replies.len(), 1);
    assert_eq!(thread.replies[0].replies.len(), 1);
    assert_eq!(thread.replies[0].post.author, "replier");

    let topics = forum.topics(PaginationParams::default()).await.unwrap();
    assert_eq!(topics.meta.total, 1);

    assert!(matches!(
        forum.delete(replier.id, topic.id).await,
        Err(AppError::Forbidden)
    ));
    forum.delete(author.id, topic.id).await.unwrap();
    assert!(matches!(forum.thread(reply.id).await, Err(AppError::NotFound)));
}
