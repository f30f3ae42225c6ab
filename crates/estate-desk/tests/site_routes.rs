use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use estate_desk::accounts::AccountService;
use estate_desk::contacts::{InquiryNotification, InquiryNotifier, InquiryService, NotifyError};
use estate_desk::listings::{Listing, ListingId, ListingService, Realtor};
use estate_desk::storage::{
    InMemoryContactRepository, InMemoryListingRepository, InMemorySessionStore,
    InMemoryUserRepository,
};
use estate_desk::web::{site_router, INVALID_FORM_MESSAGE};
use serde_json::Value;
use tower::ServiceExt;

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<InquiryNotification>>,
}

impl InquiryNotifier for Outbox {
    fn notify(&self, notification: InquiryNotification) -> Result<(), NotifyError> {
        self.sent.lock().expect("outbox lock").push(notification);
        Ok(())
    }
}

fn listing(id: u64, minutes: i64) -> Listing {
    Listing {
        id: ListingId(id),
        title: format!("Listing {id}"),
        address: format!("{id} Main Street"),
        city: "Boston".to_string(),
        state: "MA".to_string(),
        zipcode: "02101".to_string(),
        description: "Bright home close to the park".to_string(),
        price: 400_000,
        bedrooms: 3,
        bathrooms: 2.0,
        garage: 1,
        sqft: 1800,
        lot_size: 0.25,
        realtor: Some(Realtor {
            name: "Kyle Brown".to_string(),
            email: "kyle@example.com".to_string(),
            phone: None,
        }),
        is_published: true,
        list_date: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes),
    }
}

struct Site {
    router: Router,
    contacts: Arc<InMemoryContactRepository>,
    outbox: Arc<Outbox>,
}

fn site(listings: Vec<Listing>) -> Site {
    let users = Arc::new(InMemoryUserRepository::default());
    let contacts = Arc::new(InMemoryContactRepository::default());
    let sessions = Arc::new(InMemorySessionStore::default());
    let outbox = Arc::new(Outbox::default());

    let accounts = Arc::new(AccountService::new(users, contacts.clone(), sessions));
    let inquiries = Arc::new(InquiryService::new(
        contacts.clone(),
        outbox.clone(),
        "operations@estate-desk.local",
    ));
    let catalog = Arc::new(ListingService::new(Arc::new(
        InMemoryListingRepository::new(listings),
    )));

    Site {
        router: site_router(accounts, inquiries, catalog),
        contacts,
        outbox,
    }
}

fn thirteen_listings() -> Vec<Listing> {
    (1..=13).map(|id| listing(id, id as i64)).collect()
}

async fn get(router: &Router, uri: &str) -> Response {
    router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router responds")
}

async fn post_form(router: &Router, uri: &str, form: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(request.body(Body::from(form.to_string())).expect("request"))
        .await
        .expect("router responds")
}

async fn json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn header<'a>(response: &'a Response, name: axum::http::HeaderName) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

fn ids(listings: &Value) -> Vec<u64> {
    listings
        .as_array()
        .expect("listing array")
        .iter()
        .filter_map(|listing| listing["id"].as_u64())
        .collect()
}

#[tokio::test]
async fn index_paginates_published_listings_newest_first() {
    let site = site(thirteen_listings());

    let body = json(get(&site.router, "/listings").await).await;
    assert_eq!(body["number"], 1);
    assert_eq!(body["num_pages"], 3);
    assert_eq!(body["count"], 13);
    assert_eq!(ids(&body["items"]), vec![13, 12, 11, 10, 9, 8]);

    let body = json(get(&site.router, "/listings?page=3").await).await;
    assert_eq!(ids(&body["items"]), vec![1]);
    assert_eq!(body["has_next"], false);

    let body = json(get(&site.router, "/listings?page=4").await).await;
    assert_eq!(body["number"], 3);

    let body = json(get(&site.router, "/listings?page=abc").await).await;
    assert_eq!(body["number"], 1);
}

#[tokio::test]
async fn unpublished_listing_is_hidden_from_index_but_found_by_search_and_detail() {
    let mut listings = thirteen_listings();
    listings[12].is_published = false;
    let site = site(listings);

    let body = json(get(&site.router, "/listings").await).await;
    assert_eq!(body["count"], 12);
    assert!(!ids(&body["items"]).contains(&13));

    let body = json(get(&site.router, "/listings/search").await).await;
    assert!(ids(&body["listings"]).contains(&13));

    let response = get(&site.router, "/listings/13").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_applies_every_filter_together() {
    let mut listings = Vec::new();
    let mut a = listing(1, 1);
    a.description = "Sunny pool house".to_string();
    a.bedrooms = 3;
    a.price = 400_000;
    listings.push(a);

    let mut b = listing(2, 2);
    b.description = "POOL and garden".to_string();
    b.bedrooms = 5;
    b.price = 350_000;
    listings.push(b);

    let mut c = listing(3, 3);
    c.description = "Pool views".to_string();
    c.city = "Salem".to_string();
    c.price = 300_000;
    listings.push(c);

    let mut d = listing(4, 4);
    d.description = "Pool, renovated".to_string();
    d.price = 600_000;
    listings.push(d);

    let site = site(listings);
    let response = get(
        &site.router,
        "/listings/search?keywords=pool&city=boston&bedrooms=4&price=500000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(ids(&body["listings"]), vec![1]);
    assert_eq!(body["values"]["keywords"], "pool");
    assert!(body["choices"]["states"].as_array().is_some());
}

#[tokio::test]
async fn blank_search_fields_are_echoed_back_unchanged() {
    let site = site(thirteen_listings());
    let response = get(&site.router, "/listings/search?keywords=&city=Boston&price=").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["listings"].as_array().map(Vec::len), Some(13));
    assert_eq!(body["values"]["keywords"], "");
    assert_eq!(body["values"]["city"], "Boston");
    assert_eq!(body["values"]["price"], "");
    assert!(body["values"].get("bedrooms").is_none());
}

#[tokio::test]
async fn search_rejects_non_numeric_bounds() {
    let site = site(thirteen_listings());
    let response = get(&site.router, "/listings/search?price=cheap").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_or_malformed_listing_ids_are_not_found() {
    let site = site(thirteen_listings());
    assert_eq!(
        get(&site.router, "/listings/99").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        get(&site.router, "/listings/abc").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn landing_features_three_newest_published_listings() {
    let mut listings = thirteen_listings();
    listings[12].is_published = false;
    let site = site(listings);

    let body = json(get(&site.router, "/").await).await;
    assert_eq!(ids(&body["listings"]), vec![12, 11, 10]);
    assert_eq!(
        body["choices"]["bedrooms"].as_array().map(Vec::len),
        Some(10)
    );
}

#[tokio::test]
async fn registered_user_inquires_once_and_sees_it_on_dashboard() {
    let site = site(thirteen_listings());

    let response = post_form(
        &site.router,
        "/register",
        "first_name=Jane&last_name=Doe&username=jdoe&email=jdoe%40example.com&password=pw&password2=pw",
        None,
    )
    .await;
    assert_eq!(header(&response, LOCATION), Some("/login"));

    let response = post_form(&site.router, "/login", "username=jdoe&password=pw", None).await;
    assert_eq!(header(&response, LOCATION), Some("/dashboard"));
    let cookie = header(&response, SET_COOKIE)
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_string();

    let inquiry = "listing_id=7&listing=Listing+7&name=Jane+Doe&email=jdoe%40example.com\
                   &phone=555-0100&message=Viewing%3F&user_id=&realtor_email=kyle%40example.com";
    let response = post_form(&site.router, "/contact", inquiry, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, LOCATION), Some("/listings/7"));
    assert_eq!(json(response).await["message"]["level"], "success");

    let response = post_form(&site.router, "/contact", inquiry, Some(&cookie)).await;
    let body = json(response).await;
    assert_eq!(body["message"]["level"], "error");
    assert_eq!(
        body["message"]["text"],
        "You have already made an inquiry for this listing"
    );
    assert_eq!(site.contacts.len().expect("len"), 1);
    assert_eq!(site.outbox.sent.lock().expect("outbox lock").len(), 1);

    let request = Request::get("/dashboard")
        .header(COOKIE, cookie.as_str())
        .body(Body::empty())
        .expect("request");
    let response = site.router.clone().oneshot(request).await.expect("responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["user"]["username"], "jdoe");
    assert_eq!(body["contacts"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["contacts"][0]["listing_id"], 7);
}

#[tokio::test]
async fn anonymous_visitor_can_inquire_repeatedly() {
    let site = site(thirteen_listings());
    let inquiry = "listing_id=2&listing=Listing+2&name=Sam&email=sam%40example.com\
                   &phone=&message=Hi&user_id=42";

    for _ in 0..2 {
        let response = post_form(&site.router, "/contact", inquiry, None).await;
        assert_eq!(header(&response, LOCATION), Some("/listings/2"));
    }
    assert_eq!(site.contacts.len().expect("len"), 2);

    let response = get(&site.router, "/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, LOCATION), Some("/login"));
}

#[tokio::test]
async fn stale_session_cookie_is_treated_as_anonymous() {
    let site = site(thirteen_listings());
    let request = Request::get("/dashboard")
        .header(COOKIE, "estate_session=not-a-real-session")
        .body(Body::empty())
        .expect("request");
    let response = site.router.clone().oneshot(request).await.expect("responds");
    assert_eq!(header(&response, LOCATION), Some("/login"));
}

#[tokio::test]
async fn quoted_session_cookie_still_authenticates() {
    let site = site(thirteen_listings());
    post_form(
        &site.router,
        "/register",
        "first_name=Jane&last_name=Doe&username=jdoe&email=jdoe%40example.com&password=pw&password2=pw",
        None,
    )
    .await;
    let response = post_form(&site.router, "/login", "username=jdoe&password=pw", None).await;
    let token = header(&response, SET_COOKIE)
        .and_then(|value| value.split(';').next())
        .and_then(|pair| pair.strip_prefix("estate_session="))
        .expect("session cookie")
        .to_string();

    let request = Request::get("/dashboard")
        .header(COOKIE, format!("theme=dark; estate_session=\"{token}\""))
        .body(Body::empty())
        .expect("request");
    let response = site.router.clone().oneshot(request).await.expect("responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["user"]["username"], "jdoe");
}

#[tokio::test]
async fn malformed_form_posts_redirect_back_with_a_message() {
    let site = site(thirteen_listings());
    let cases = [
        (
            "/register",
            "first_name=Jane&last_name=Doe&username=jdoe&email=jdoe%40example.com&password=pw",
            "/register",
        ),
        ("/login", "password=pw", "/login"),
        (
            "/contact",
            "listing_id=abc&listing=Listing+1&name=Sam&email=sam%40example.com&phone=&message=Hi",
            "/",
        ),
    ];

    for (uri, form, back_to) in cases {
        let response = post_form(&site.router, uri, form, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(header(&response, LOCATION), Some(back_to));
        let body = json(response).await;
        assert_eq!(body["redirect_to"], back_to);
        assert_eq!(body["message"]["level"], "error");
        assert_eq!(body["message"]["text"], INVALID_FORM_MESSAGE);
    }
    assert_eq!(site.contacts.len().expect("len"), 0);
    assert!(site.outbox.sent.lock().expect("outbox lock").is_empty());
}
