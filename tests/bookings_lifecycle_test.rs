use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

mod common;
use common::{
    SHARER_USER_ID_HEADER, default_test_config, list_item, register_user, setup_instance,
};

async fn create_booking(
    instance: &common::InstanceState,
    booker_id: i64,
    item_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> reqwest::Response {
    instance
        .reqwest_client
        .post(format!("{}/bookings", instance.server_url))
        .header(SHARER_USER_ID_HEADER, booker_id)
        .json(&json!({ "itemId": item_id, "start": start, "end": end }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_booking_lifecycle() {
    let instance = setup_instance(default_test_config()).await.unwrap();
    let owner_id = register_user(&instance).await;
    let booker_id = register_user(&instance).await;
    let outsider_id = register_user(&instance).await;
    let item_id = list_item(&instance, owner_id, "Canoe", true).await;

    let start = Utc::now() + Duration::days(1);
    let response = create_booking(&instance, booker_id, item_id, start, start + Duration::days(1))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: Value = response.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();
    assert_eq!(booking["status"], "WAITING");
    assert_eq!(booking["item"]["name"], "Canoe");
    assert_eq!(booking["booker"]["id"].as_i64().unwrap(), booker_id);

    // Booker and owner can read it, anyone else cannot.
    for user_id in [booker_id, owner_id] {
        let response = instance
            .reqwest_client
            .get(format!("{}/bookings/{}", instance.server_url, booking_id))
            .header(SHARER_USER_ID_HEADER, user_id)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = instance
        .reqwest_client
        .get(format!("{}/bookings/{}", instance.server_url, booking_id))
        .header(SHARER_USER_ID_HEADER, outsider_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Only the owner may approve; the booker trying looks like a missing
    // booking.
    let response = instance
        .reqwest_client
        .patch(format!(
            "{}/bookings/{}?approved=true",
            instance.server_url, booking_id
        ))
        .header(SHARER_USER_ID_HEADER, booker_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = instance
        .reqwest_client
        .patch(format!(
            "{}/bookings/{}?approved=true",
            instance.server_url, booking_id
        ))
        .header(SHARER_USER_ID_HEADER, owner_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["status"], "APPROVED");

    // An approved booking is final.
    for approved in [true, false] {
        let response = instance
            .reqwest_client
            .patch(format!(
                "{}/bookings/{}?approved={}",
                instance.server_url, booking_id, approved
            ))
            .header(SHARER_USER_ID_HEADER, owner_id)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_booking_rejection() {
    let instance = setup_instance(default_test_config()).await.unwrap();
    let owner_id = register_user(&instance).await;
    let booker_id = register_user(&instance).await;
    let item_id = list_item(&instance, owner_id, "Bike", true).await;

    let start = Utc::now() + Duration::days(1);
    let response = create_booking(&instance, booker_id, item_id, start, start + Duration::days(1))
        .await;
    let booking: Value = response.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();

    let response = instance
        .reqwest_client
        .patch(format!(
            "{}/bookings/{}?approved=false",
            instance.server_url, booking_id
        ))
        .header(SHARER_USER_ID_HEADER, owner_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["status"], "REJECTED");

    // A rejected booking can still be approved afterwards.
    let response = instance
        .reqwest_client
        .patch(format!(
            "{}/bookings/{}?approved=true",
            instance.server_url, booking_id
        ))
        .header(SHARER_USER_ID_HEADER, owner_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["status"], "APPROVED");
}

#[tokio::test]
async fn test_booking_creation_validations() {
    let instance = setup_instance(default_test_config()).await.unwrap();
    let owner_id = register_user(&instance).await;
    let booker_id = register_user(&instance).await;
    let item_id = list_item(&instance, owner_id, "Projector", true).await;
    let unavailable_id = list_item(&instance, owner_id, "Broken projector", false).await;

    let now = Utc::now();
    let tomorrow = now + Duration::days(1);

    // Unknown item.
    let response =
        create_booking(&instance, booker_id, 99999, tomorrow, tomorrow + Duration::days(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown booker.
    let response =
        create_booking(&instance, 99999, item_id, tomorrow, tomorrow + Duration::days(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner booking their own item is refused outright.
    let response =
        create_booking(&instance, owner_id, item_id, tomorrow, tomorrow + Duration::days(1)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unavailable item.
    let response = create_booking(
        &instance,
        booker_id,
        unavailable_id,
        tomorrow,
        tomorrow + Duration::days(1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Start in the past.
    let response = create_booking(
        &instance,
        booker_id,
        item_id,
        now - Duration::hours(1),
        tomorrow,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // End before start.
    let response = create_booking(
        &instance,
        booker_id,
        item_id,
        tomorrow + Duration::days(1),
        tomorrow,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing dates.
    let response = instance
        .reqwest_client
        .post(format!("{}/bookings", instance.server_url))
        .header(SHARER_USER_ID_HEADER, booker_id)
        .json(&json!({ "itemId": item_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing itemId.
    let response = instance
        .reqwest_client
        .post(format!("{}/bookings", instance.server_url))
        .header(SHARER_USER_ID_HEADER, booker_id)
        .json(&json!({ "start": tomorrow, "end": tomorrow + Duration::days(1) }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
