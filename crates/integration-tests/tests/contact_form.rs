//! Contact form submissions end to end.

use serde_json::json;
use toyshop_core::Collection;
use toyshop_integration_tests::TestContext;

const VALID: [(&str, &str); 4] = [
    ("name", "Asha"),
    ("email", "asha@example.com"),
    ("phone", "+91 98400 12345"),
    ("message", "Do you gift-wrap?"),
];

#[tokio::test]
async fn test_valid_inquiry_is_stored() {
    let ctx = TestContext::new(&json!({})).await;

    let (status, body) = ctx.post_form("/contact", &VALID).await;
    assert_eq!(status, 200);
    assert!(body.contains("We received your message"));

    let stored = ctx.store.records(Collection::ContactInquiries).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text("email"), Some("asha@example.com"));
    assert_eq!(stored[0].text("status"), Some("new"));
    assert!(stored[0].text("submitted_at").is_some());
}

#[tokio::test]
async fn test_invalid_email_keeps_input() {
    let ctx = TestContext::new(&json!({})).await;

    let (status, body) = ctx
        .post_form(
            "/contact",
            &[("name", "Asha"), ("email", "not-an-email"), ("message", "Hello")],
        )
        .await;
    assert_eq!(status, 422);
    assert!(body.contains("role=\"alert\""));
    assert!(body.contains("value=\"not-an-email\""));
    assert!(ctx.store.records(Collection::ContactInquiries).await.is_empty());
}

#[tokio::test]
async fn test_store_failure_answers_503() {
    let ctx = TestContext::new(&json!({})).await;
    ctx.store.fail_create_call(1);

    let (status, body) = ctx.post_form("/contact", &VALID).await;
    assert_eq!(status, 503);
    assert!(body.contains("couldn"));
    assert!(body.contains("Do you gift-wrap?"));
}

#[tokio::test]
async fn test_form_posts_are_rate_limited() {
    let ctx = TestContext::new(&json!({})).await;

    let mut statuses = Vec::new();
    for _ in 0..8 {
        statuses.push(ctx.post_form("/contact", &[("name", "")]).await.0);
    }
    assert_eq!(statuses[0], 422);
    assert!(statuses.contains(&429));

    // Reading the form is not limited.
    assert_eq!(ctx.get("/contact").await.0, 200);
}
