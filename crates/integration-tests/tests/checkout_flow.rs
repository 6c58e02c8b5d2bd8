//! Card checkout attempts from buyer form to result page.

use serde_json::{Value, json};
use toyshop_core::payment::payment_signature;
use toyshop_integration_tests::TestContext;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_SECRET: &str = "kQ7#vN2$pL9@xR4!";

fn seed() -> Value {
    json!({
        "toys": [
            {"id": "t1", "name": "Rag Doll", "price": 350, "color": "Red, Blue"},
            {"id": "t2", "name": "Mystery Box"}
        ]
    })
}

const BUYER: [(&str, &str); 4] = [
    ("name", "Asha"),
    ("email", "asha@example.com"),
    ("quantity", "2"),
    ("color", "Blue"),
];

/// Pull the attempt id out of the pay page's result link.
fn attempt_id(pay_page: &str) -> Uuid {
    let start = pay_page.find("attempts").expect("no result link") + "attempts".len();
    let rest = &pay_page[start..];
    let hex = rest
        .find(|c: char| c.is_ascii_hexdigit())
        .expect("no attempt id");
    Uuid::parse_str(&rest[hex..hex + 36]).expect("bad attempt id")
}

async fn complete(ctx: &TestContext, id: Uuid, outcome: Value) -> (u16, Value) {
    let resp = ctx
        .client
        .post(ctx.url(&format!("/api/checkout/{id}/complete")))
        .json(&outcome)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_checkout_disabled_without_payment_key() {
    let ctx = TestContext::new(&seed()).await;
    assert_eq!(ctx.get("/checkout/t1").await.0, 404);
    assert_eq!(ctx.post_form("/checkout/t1", &BUYER).await.0, 404);
}

#[tokio::test]
async fn test_successful_payment() {
    let ctx = TestContext::with_payment(&seed()).await;

    let (status, body) = ctx.get("/products/t1").await;
    assert_eq!(status, 200);
    assert!(body.contains("Buy now"));

    let (status, body) = ctx.get("/checkout/t1?color=Blue").await;
    assert_eq!(status, 200);
    assert!(body.contains("Rag Doll"));

    let (status, pay_page) = ctx.post_form("/checkout/t1", &BUYER).await;
    assert_eq!(status, 200);
    assert!(pay_page.contains("2 x Rag Doll (Blue)"));
    assert!(pay_page.contains("https://checkout.razorpay.com/v1/checkout.js"));
    let id = attempt_id(&pay_page);

    let (_, result) = ctx.get(&format!("/checkout/attempts/{id}")).await;
    assert!(result.contains("status-pending"));

    // Without an order the provider's handler only returns the payment id.
    let (status, body) = complete(
        &ctx,
        id,
        json!({"status": "success", "response": {"razorpay_payment_id": "pay_29QQoUBi66xm2f"}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "succeeded");
    assert_eq!(body["reference"], "pay_29QQoUBi66xm2f");
    assert_eq!(body["verified"], false);
    assert!(body.get("order_id").is_none());
    assert_eq!(body["redirect"], format!("/checkout/attempts/{id}"));

    let (_, result) = ctx.get(&format!("/checkout/attempts/{id}")).await;
    assert!(result.contains("status-succeeded"));
    assert!(result.contains("Your browser reported a successful payment"));
    assert!(result.contains("pay_29QQoUBi66xm2f"));

    let (status, _) = complete(&ctx, id, json!({"status": "cancelled"})).await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn test_cancelled_and_failed_payments() {
    let ctx = TestContext::with_payment(&seed()).await;

    let (_, pay_page) = ctx.post_form("/checkout/t1", &BUYER).await;
    let cancelled = attempt_id(&pay_page);
    let (status, body) = complete(&ctx, cancelled, json!({"status": "cancelled"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "cancelled");

    let (_, pay_page) = ctx.post_form("/checkout/t1", &BUYER).await;
    let failed = attempt_id(&pay_page);
    let (_, body) = complete(
        &ctx,
        failed,
        json!({"status": "failed", "error": {"description": "card declined"}}),
    )
    .await;
    assert_eq!(body["status"], "failed");

    let (_, result) = ctx.get(&format!("/checkout/attempts/{failed}")).await;
    assert!(result.contains("Payment failed"));
}

#[tokio::test]
async fn test_invalid_buyer_details_and_unpayable_toys() {
    let ctx = TestContext::with_payment(&seed()).await;

    let (status, body) = ctx
        .post_form("/checkout/t1", &[("name", "Asha"), ("email", "asha@example.com"), ("quantity", "0")])
        .await;
    assert_eq!(status, 422);
    assert!(body.contains("quantity must be between 1 and 10"));

    assert_eq!(ctx.get("/checkout/t2").await.0, 400);
    assert_eq!(ctx.get("/checkout/nope").await.0, 404);
}

#[tokio::test]
async fn test_unknown_attempt_and_missing_payment_id() {
    let ctx = TestContext::with_payment(&seed()).await;

    let (status, _) = complete(&ctx, Uuid::new_v4(), json!({"status": "cancelled"})).await;
    assert_eq!(status, 404);
    assert_eq!(ctx.get(&format!("/checkout/attempts/{}", Uuid::new_v4())).await.0, 404);

    let (_, pay_page) = ctx.post_form("/checkout/t1", &BUYER).await;
    let id = attempt_id(&pay_page);
    let (status, _) = complete(
        &ctx,
        id,
        json!({"status": "success", "response": {"razorpay_order_id": "order_1"}}),
    )
    .await;
    assert_eq!(status, 400);

    let (_, result) = ctx.get(&format!("/checkout/attempts/{id}")).await;
    assert!(result.contains("status-pending"));
}

#[tokio::test]
async fn test_signed_payment_for_created_order() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "order_IluGWxBm9U8zJ8"})),
        )
        .expect(2)
        .mount(&provider)
        .await;
    let ctx = TestContext::with_verified_payment(&seed(), &provider.uri(), KEY_SECRET).await;

    let (status, pay_page) = ctx.post_form("/checkout/t1", &BUYER).await;
    assert_eq!(status, 200);
    assert!(pay_page.contains("order_IluGWxBm9U8zJ8"));
    let forged = attempt_id(&pay_page);

    let (status, _) = complete(
        &ctx,
        forged,
        json!({"status": "success", "response": {
            "razorpay_order_id": "order_IluGWxBm9U8zJ8",
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": payment_signature("wrong key", "order_IluGWxBm9U8zJ8", "pay_1"),
        }}),
    )
    .await;
    assert_eq!(status, 400);
    let (_, result) = ctx.get(&format!("/checkout/attempts/{forged}")).await;
    assert!(result.contains("status-pending"));

    let (_, pay_page) = ctx.post_form("/checkout/t1", &BUYER).await;
    let id = attempt_id(&pay_page);
    let (status, body) = complete(
        &ctx,
        id,
        json!({"status": "success", "response": {
            "razorpay_order_id": "order_IluGWxBm9U8zJ8",
            "razorpay_payment_id": "pay_IluGxjr6VTlQKW",
            "razorpay_signature": payment_signature(KEY_SECRET, "order_IluGWxBm9U8zJ8", "pay_IluGxjr6VTlQKW"),
        }}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["verified"], true);
    assert_eq!(body["order_id"], "order_IluGWxBm9U8zJ8");

    let (_, result) = ctx.get(&format!("/checkout/attempts/{id}")).await;
    assert!(result.contains("Payment received. Your order reference is order_IluGWxBm9U8zJ8."));
}

#[tokio::test]
async fn test_order_creation_failure_is_bad_gateway() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&provider)
        .await;
    let ctx = TestContext::with_verified_payment(&seed(), &provider.uri(), KEY_SECRET).await;

    let (status, _) = ctx.post_form("/checkout/t1", &BUYER).await;
    assert_eq!(status, 502);
}
