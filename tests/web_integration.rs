//! Web API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

#![cfg(feature = "web")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use image::{Rgba, RgbaImage};
use investigator::{decode_image, encode_image, Investigator, ServerConfig, WebServer};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    WebServer::with_config(ServerConfig::default(), Investigator::default()).router()
}

async fn call(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn opaque_image() -> RgbaImage {
    RgbaImage::from_fn(100, 100, |x, y| Rgba([x as u8, y as u8, 128, 255]))
}

fn response_image(body: &Value) -> RgbaImage {
    decode_image(body["image_base64"].as_str().unwrap()).unwrap()
}

// TC-WEB-002: Health check endpoint
#[tokio::test]
async fn test_health() {
    let (status, body) = call("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["matting"], false);
}

// TC-WEB-003: Crop returns the clamped rectangle
#[tokio::test]
async fn test_crop() {
    let request = json!({
        "image_base64": encode_image(&opaque_image()).unwrap(),
        "selections": [{"x": 10, "y": 10, "width": 20, "height": 20}],
    });
    let (status, body) = call("POST", "/crop", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let image = response_image(&body);
    assert_eq!(image.dimensions(), (20, 20));
    assert_eq!(*image.get_pixel(0, 0), *opaque_image().get_pixel(10, 10));
}

// TC-WEB-004: Crop outside the image yields an empty image
#[tokio::test]
async fn test_crop_outside_is_empty() {
    let request = json!({
        "image_base64": encode_image(&opaque_image()).unwrap(),
        "selections": [{"x": 500, "y": 500, "width": 10, "height": 10}],
    });
    let (status, body) = call("POST", "/crop", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_base64"], "");
}

// TC-WEB-005: Blackout only touches the selection
#[tokio::test]
async fn test_blackout() {
    let source = opaque_image();
    let request = json!({
        "image_base64": format!("data:image/png;base64,{}", encode_image(&source).unwrap()),
        "selections": [{"x": 10, "y": 10, "width": 20, "height": 20}],
    });
    let (status, body) = call("POST", "/blackout", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let image = response_image(&body);
    assert_eq!(image.dimensions(), (100, 100));
    for (x, y, p) in image.enumerate_pixels() {
        if (10..30).contains(&x) && (10..30).contains(&y) {
            assert_eq!(*p, Rgba([0, 0, 0, 255]));
        } else {
            assert_eq!(p, source.get_pixel(x, y));
        }
    }
}

// TC-WEB-006: Blur keeps dimensions and leaves the outside untouched
#[tokio::test]
async fn test_blur() {
    let source = opaque_image();
    let request = json!({
        "image": encode_image(&source).unwrap(),
        "selections": [{"x": 40, "y": 40, "width": 30, "height": 30}],
    });
    let (status, body) = call("POST", "/blur", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let image = response_image(&body);
    assert_eq!(image.dimensions(), (100, 100));
    assert_eq!(image.get_pixel(5, 5), source.get_pixel(5, 5));
    assert_eq!(image.get_pixel(90, 90), source.get_pixel(90, 90));
}

// TC-WEB-007: Object extraction always returns visible pixels
#[tokio::test]
async fn test_select_object_fallback() {
    let source = RgbaImage::from_pixel(60, 60, Rgba([100, 120, 140, 255]));
    let request = json!({
        "image_base64": encode_image(&source).unwrap(),
        "selections": [{"x": 10, "y": 10, "width": 20, "height": 20}],
    });
    let (status, body) = call("POST", "/select_object", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"], "full_region");

    let image = response_image(&body);
    assert_eq!(image.dimensions(), (20, 20));
    assert!(image.pixels().all(|p| p[3] == 255));
}

// TC-WEB-008: Selection store round trip
#[tokio::test]
async fn test_select_and_deselect() {
    let (status, body) = call(
        "POST",
        "/select",
        Some(json!({"selections": [], "rect": {"x": 0, "y": 0, "width": 5, "height": 5}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let selections = body["selections"].clone();
    assert_eq!(selections.as_array().unwrap().len(), 1);

    let (_, body) = call(
        "POST",
        "/deselect",
        Some(json!({"selections": selections, "x": 50, "y": 50})),
    )
    .await;
    assert_eq!(body["selections"].as_array().unwrap().len(), 1);

    let (_, body) = call(
        "POST",
        "/deselect",
        Some(json!({"selections": selections, "x": 5, "y": 5})),
    )
    .await;
    assert!(body["selections"].as_array().unwrap().is_empty());
}

// TC-WEB-009: Undecodable image is a client error
#[tokio::test]
async fn test_bad_image() {
    let request = json!({"image_base64": "not base64 !!", "selections": []});
    let (status, body) = call("POST", "/crop", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("base64"));
}

// TC-WEB-010: CORS allows any origin
#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/crop")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
