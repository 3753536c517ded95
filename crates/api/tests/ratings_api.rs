//! Integration tests for the rating endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, fixture_app, get, post_json, session_with_both_steps, start_session};
use serde_json::{json, Value};

fn rating_payload(session_id: &str, rating_type: &str, stars: u8) -> Value {
    json!({
        "sessionId": session_id,
        "ratingType": rating_type,
        "resultIndex": 0,
        "starRating": stars,
        "categoryRatings": { "accuracy": stars, "relevance": 4 },
        "feedback": { "liked": "Clear and specific.", "disliked": "  " },
        "confidenceLevel": "Confident - I understand the strategy"
    })
}

// ---------------------------------------------------------------------------
// Test: POST /ratings creates, then updates in place
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rating_is_created_then_updated() {
    let app = fixture_app();
    let session_id = session_with_both_steps(&app).await;

    let response = post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "step1_result", 3)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["isUpdate"], false);
    let rating_id = created["data"]["ratingId"].clone();

    let response = post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "step1_result", 5)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["isUpdate"], true);
    assert_eq!(updated["data"]["ratingId"], rating_id);

    let listed = body_json(get(&app, &format!("/api/v1/ratings/session/{session_id}")).await).await;
    let ratings = listed["data"].as_array().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["starRating"], 5);
    assert_eq!(ratings[0]["isUpdated"], true);
    assert_eq!(ratings[0]["originalRatingId"], rating_id);
    assert_eq!(ratings[0]["averageCategoryRating"], 4.5);
    // Demographics come from the session's step 1 answers.
    assert_eq!(ratings[0]["userDemographics"]["geographicLocation"], "Europe");
}

#[tokio::test]
async fn different_result_indexes_are_separate_ratings() {
    let app = fixture_app();
    let session_id = session_with_both_steps(&app).await;

    let mut second = rating_payload(&session_id, "step1_result", 2);
    second["resultIndex"] = json!(1);
    post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "step1_result", 4)).await;
    let response = post_json(&app, "/api/v1/ratings", second).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listed = body_json(get(&app, &format!("/api/v1/ratings/session/{session_id}")).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: invalid submissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rating_validation_reports_every_field() {
    let app = fixture_app();
    let session_id = start_session(&app).await;

    let response = post_json(
        &app,
        "/api/v1/ratings",
        json!({
            "sessionId": session_id,
            "ratingType": "best_result",
            "starRating": 6,
            "categoryRatings": { "creativity": 0 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"ratingType"));
    assert!(fields.contains(&"starRating"));
    assert!(fields.iter().any(|f| f.starts_with("categoryRatings")));
}

#[tokio::test]
async fn rating_for_unknown_session_returns_404() {
    let app = fixture_app();
    let response = post_json(&app, "/api/v1/ratings", rating_payload("missing-session", "final_result", 4)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ratings_for_unknown_session_are_empty() {
    let app = fixture_app();
    let response = get(&app, "/api/v1/ratings/session/missing-session").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: GET /ratings/average/{type}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn average_rating_reports_histogram() {
    let app = fixture_app();
    let first = session_with_both_steps(&app).await;
    let second = session_with_both_steps(&app).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&first, "final_result", 4)).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&second, "final_result", 5)).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&second, "step2_result", 1)).await;

    let response = get(&app, "/api/v1/ratings/average/final_result").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["ratingType"], "final_result");
    assert_eq!(data["totalRatings"], 2);
    assert_eq!(data["avgStarRating"], 4.5);
    assert_eq!(data["avgRelevance"], 4.0);
    assert_eq!(
        data["ratingDistribution"],
        json!({ "1": 0, "2": 0, "3": 0, "4": 1, "5": 1 })
    );
}

#[tokio::test]
async fn average_rating_with_no_ratings_is_zero() {
    let app = fixture_app();
    let json = body_json(get(&app, "/api/v1/ratings/average/hero_slogans").await).await;
    assert_eq!(json["data"]["totalRatings"], 0);
    assert_eq!(json["data"]["avgStarRating"], 0.0);
}

#[tokio::test]
async fn average_rating_rejects_unknown_type() {
    let app = fixture_app();
    let response = get(&app, "/api/v1/ratings/average/not_a_type").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn average_rating_filters_by_region() {
    let app = fixture_app();
    let session_id = session_with_both_steps(&app).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "final_result", 4)).await;

    let json = body_json(
        get(&app, "/api/v1/ratings/average/final_result?geographicLocation=Asia-Pacific").await,
    )
    .await;
    assert_eq!(json["data"]["totalRatings"], 0);

    let json = body_json(
        get(&app, "/api/v1/ratings/average/final_result?geographicLocation=Europe").await,
    )
    .await;
    assert_eq!(json["data"]["totalRatings"], 1);
}

// ---------------------------------------------------------------------------
// Test: GET /ratings/analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analytics_groups_by_rating_type() {
    let app = fixture_app();
    let session_id = session_with_both_steps(&app).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "final_result", 4)).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "step1_result", 2)).await;
    let mut again = rating_payload(&session_id, "step1_result", 3);
    again["resultIndex"] = json!(2);
    post_json(&app, "/api/v1/ratings", again).await;

    let response = get(&app, "/api/v1/ratings/analytics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["groupBy"], "ratingType");
    let groups = data["analytics"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["key"], "step1_result");
    assert_eq!(groups[0]["totalRatings"], 2);
    assert_eq!(groups[0]["uniqueSessions"], 1);
    assert_eq!(data["overallStats"]["totalRatings"], 3);
    assert_eq!(data["overallStats"]["uniqueRatingTypeCount"], 2);
}

#[tokio::test]
async fn analytics_echoes_filters_and_groups_by_industry() {
    let app = fixture_app();
    let session_id = session_with_both_steps(&app).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "final_result", 4)).await;

    let json = body_json(
        get(&app, "/api/v1/ratings/analytics?groupBy=industry&ratingType=final_result").await,
    )
    .await;
    let data = &json["data"];
    assert_eq!(data["groupBy"], "industry");
    assert_eq!(data["filters"]["ratingType"], "final_result");
    assert_eq!(data["analytics"][0]["key"], "Technology & IT");
}

#[tokio::test]
async fn analytics_rejects_unknown_group() {
    let app = fixture_app();
    let response = get(&app, "/api/v1/ratings/analytics?groupBy=planet").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: GET /ratings/feedback/recent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recent_feedback_only_lists_written_feedback() {
    let app = fixture_app();
    let session_id = session_with_both_steps(&app).await;
    post_json(&app, "/api/v1/ratings", rating_payload(&session_id, "final_result", 5)).await;

    let mut silent = rating_payload(&session_id, "step2_result", 2);
    silent["feedback"] = json!({});
    post_json(&app, "/api/v1/ratings", silent).await;

    let json = body_json(get(&app, "/api/v1/ratings/feedback/recent").await).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ratingType"], "final_result");
    assert_eq!(items[0]["feedback"]["liked"], "Clear and specific.");

    let json = body_json(get(&app, "/api/v1/ratings/feedback/recent?maxRating=4").await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn recent_feedback_rejects_out_of_range_bounds() {
    let app = fixture_app();
    let response = get(&app, "/api/v1/ratings/feedback/recent?minRating=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "minRating");
}
