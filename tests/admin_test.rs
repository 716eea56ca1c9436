//! Admin console integration tests: exports, inline photos and lists.

mod common;

use carhub::domain::{AdminQuery, CarStatus, PhotoInput, UpdateUser};
use carhub::errors::AppError;
use carhub::export::ExportFormat;
use carhub::services::ServiceContainer;

use common::Harness;

fn photo(url: &str, is_main: bool) -> PhotoInput {
    PhotoInput {
        image_url: url.to_string(),
        is_main,
    }
}

#[tokio::test]
async fn test_json_export_formats_active_listings() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let active = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;
    h.listing(&seller, &camry, 2021, 2_000_000, CarStatus::Moderation).await;

    let file = h
        .services
        .admin()
        .export(ExportFormat::Json, None)
        .await
        .unwrap();
    assert_eq!(file.rows, 1);

    let rows: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
    let row = &rows[0];
    assert_eq!(row["ID"], active.car.id);
    assert_eq!(row["Марка автомобиля"], "Toyota");
    assert_eq!(row["Цена"], "1,200,000 ₽");
    assert_eq!(row["Статус"], "Активно");
    assert_eq!(row["Продавец"], "SELLER");
}

#[tokio::test]
async fn test_csv_export_has_header_row() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;

    let file = h
        .services
        .admin()
        .export(ExportFormat::Csv, None)
        .await
        .unwrap();
    let text = String::from_utf8(file.bytes).unwrap();
    let mut lines = text.lines();

    assert!(lines.next().unwrap().starts_with("ID,Марка автомобиля,Модель автомобиля"));
    assert!(lines.next().unwrap().contains("\"1,200,000 ₽\""));
}

#[tokio::test]
async fn test_selected_export_skips_inactive_ids() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let first = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;
    h.listing(&seller, &camry, 2018, 800_000, CarStatus::Active).await;
    let sold = h.listing(&seller, &camry, 2017, 600_000, CarStatus::Sold).await;

    let file = h
        .services
        .admin()
        .export(ExportFormat::Xlsx, Some(vec![first.car.id, sold.car.id]))
        .await
        .unwrap();

    assert_eq!(file.rows, 1);
    assert!(file.bytes.starts_with(b"PK"));
    assert_eq!(file.file_name(), "Объявления_CarHub.xlsx");
}

#[tokio::test]
async fn test_replace_photos_swaps_whole_set() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    let listing = h.listing(&seller, &camry, 2020, 1_200_000, CarStatus::Active).await;
    let admin = h.services.admin();

    let photos = admin
        .replace_photos(
            listing.car.id,
            vec![
                photo("https://img.example.com/front.jpg", true),
                photo("https://img.example.com/back.jpg", false),
            ],
        )
        .await
        .unwrap();
    assert_eq!(photos.len(), 2);

    let photos = admin
        .replace_photos(
            listing.car.id,
            vec![photo("https://img.example.com/side.jpg", true)],
        )
        .await
        .unwrap();
    assert_eq!(photos.len(), 1);

    let detail = h.services.cars().detail(listing.car.id).await.unwrap();
    assert_eq!(detail.photos.len(), 1);
    assert_eq!(detail.photos[0].image_url, "https://img.example.com/side.jpg");

    // Two main photos are rejected and the stored set is left alone
    let rejected = admin
        .replace_photos(
            listing.car.id,
            vec![
                photo("https://img.example.com/a.jpg", true),
                photo("https://img.example.com/b.jpg", true),
            ],
        )
        .await;
    assert!(matches!(rejected, Err(AppError::FieldErrors(_))));
    assert_eq!(
        h.services.cars().detail(listing.car.id).await.unwrap().photos.len(),
        1
    );

    assert!(matches!(
        admin.replace_photos(9_999, vec![]).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_admin_lists_filter_and_paginate() {
    let h = Harness::new().await;
    let seller = h.user("seller").await;
    h.staff("boss").await;
    let (_, camry) = h.catalog("Toyota", "Camry").await;
    for year in 2015..2020 {
        h.listing(&seller, &camry, year, 1_000_000, CarStatus::Moderation).await;
    }
    h.listing(&seller, &camry, 2023, 2_000_000, CarStatus::Active).await;

    let admin = h.services.admin();

    let staff = admin
        .users(AdminQuery {
            is_staff: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(staff.meta.total, 1);
    assert_eq!(staff.data[0].username, "boss");

    let pending = admin
        .cars(AdminQuery {
            status: Some("moderation".into()),
            per_page: Some(2),
            page: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.meta.total, 5);
    assert_eq!(pending.meta.total_pages, 3);
    assert_eq!(pending.data.len(), 1);

    let counts = admin.overview().await.unwrap();
    assert_eq!(counts.users, 2);
    assert_eq!(counts.cars, 6);
}

#[tokio::test]
async fn test_update_user_rejects_taken_phone() {
    let h = Harness::new().await;
    let first = h.user("first").await;
    let second = h.user("second").await;
    let admin = h.services.admin();

    admin
        .update_user(
            first.id,
            UpdateUser {
                phone: Some("+7 900 000-00-01".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let taken = admin
        .update_user(
            second.id,
            UpdateUser {
                phone: Some("+7 900 000-00-01".into()),
                ..Default::default()
            },
        )
        .await;

    match taken {
        Err(AppError::FieldErrors(fields)) => assert!(fields.contains_key("phone")),
        other => panic!("expected phone field error, got {:?}", other.map(|u| u.id)),
    }
}
