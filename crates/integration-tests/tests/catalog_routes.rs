//! Catalog pages and the JSON catalog over HTTP.

use serde_json::{Value, json};
use toyshop_integration_tests::TestContext;

fn seed() -> Value {
    json!({
        "storeinformation": [{"id": "s1", "whatsapp": "+91 98400-12345", "phone": "044 2434 5678"}],
        "toycategories": [
            {"id": "c1", "name": "Dolls", "display_order": 2},
            {"id": "c2", "name": "Robots", "display_order": 1},
            {"id": "c3", "name": "Retired", "is_active": false}
        ],
        "toys": [
            {"id": "t1", "name": "Rag Doll", "price": 350, "category": "Dolls",
             "age_group": "3-5", "color": "Red, Blue", "is_featured": true},
            {"id": "t2", "name": "Tin Robot", "price": 899, "category": "Robots",
             "age_group": "8+", "color": "Silver"},
            {"id": "t3", "name": "Baby Rattle", "category": "Baby",
             "age_group": "6 months", "color": "Yellow"}
        ]
    })
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new(&seed()).await;
    assert_eq!(ctx.get("/health").await.0, 200);
    assert_eq!(ctx.get("/health/ready").await.0, 200);

    ctx.store.set_unavailable(true);
    assert_eq!(ctx.get("/health/ready").await.0, 503);
    assert_eq!(ctx.get("/health").await.0, 200);
}

#[tokio::test]
async fn test_home_shows_featured_and_category_pills() {
    let ctx = TestContext::new(&seed()).await;
    let (status, body) = ctx.get("/").await;
    assert_eq!(status, 200);
    assert!(body.contains("Rag Doll"));
    assert!(body.contains("Robots"));
    assert!(!body.contains("Retired"));
    assert!(body.contains("https://wa.me/919840012345"));
    assert!(body.contains(r#"href="tel:04424345678""#));
}

#[tokio::test]
async fn test_shop_filters_by_age_and_color() {
    let ctx = TestContext::new(&seed()).await;

    let (status, body) = ctx.get("/shop").await;
    assert_eq!(status, 200);
    assert!(body.contains("3 toys"));

    let (_, body) = ctx.get("/shop?age=3-5").await;
    assert!(body.contains("Rag Doll"));
    assert!(!body.contains("Tin Robot"));

    let (_, body) = ctx.get("/shop?color=blue").await;
    assert!(body.contains("1 toy"));
    assert!(body.contains("Rag Doll"));

    let (_, body) = ctx.get("/shop?category=all&age=nonsense").await;
    assert!(body.contains("3 toys"));
}

#[tokio::test]
async fn test_shop_outage_renders_empty_catalog() {
    let ctx = TestContext::new(&seed()).await;
    ctx.store.set_unavailable(true);
    let (status, body) = ctx.get("/shop").await;
    assert_eq!(status, 200);
    assert!(body.contains("No toys match these filters."));
}

#[tokio::test]
async fn test_product_page_and_color_selection() {
    let ctx = TestContext::new(&seed()).await;

    let (status, body) = ctx.get("/products/t1?color=BLUE").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Rag Doll</h1>"));
    assert!(body.contains("Color: Blue"));
    assert!(body.contains("https://wa.me/919840012345?text="));
    assert!(!body.contains("Buy now"));

    let (_, body) = ctx.get("/products/t3").await;
    assert!(body.contains("Ask for price"));
}

#[tokio::test]
async fn test_unknown_product_and_page_are_404() {
    let ctx = TestContext::new(&seed()).await;
    assert_eq!(ctx.get("/products/missing").await.0, 404);
    assert_eq!(ctx.get("/pages/missing").await.0, 404);
    assert_eq!(ctx.get("/no/such/route").await.0, 404);
}

#[tokio::test]
async fn test_policy_page_renders_markdown() {
    let ctx = TestContext::new(&seed()).await;
    let (status, body) = ctx.get("/pages/shipping").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h2"));
}

#[tokio::test]
async fn test_api_catalog_reports_filters_and_options() {
    let ctx = TestContext::new(&seed()).await;
    let body: Value = ctx
        .client
        .get(ctx.url("/api/catalog?category=dolls&age=all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["id"], "t1");
    assert_eq!(body["filters"]["category"], "dolls");
    assert!(body["filters"]["age"].is_null());
    assert_eq!(body["options"]["categories"], json!(["Robots", "Dolls"]));
    assert_eq!(body["options"]["ages"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let ctx = TestContext::new(&seed()).await;
    let resp = ctx
        .client
        .get(ctx.url("/shop"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    let headers = resp.headers();
    assert_eq!(headers["x-request-id"], "trace-me");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}
