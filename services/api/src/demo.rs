use crate::infra::SiteServices;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use estate_desk::accounts::{LoginForm, RegistrationForm};
use estate_desk::config::DEFAULT_OPERATIONS_EMAIL;
use estate_desk::contacts::InquiryForm;
use estate_desk::error::AppError;
use estate_desk::listings::{
    Listing, ListingError, ListingId, ListingImporter, Realtor, SearchParams,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// CSV export of listings to browse instead of the built-in samples.
    #[arg(long)]
    pub(crate) listings: Option<PathBuf>,
    /// Keywords for the search step.
    #[arg(long, default_value = "kitchen")]
    pub(crate) keywords: String,
    /// Maximum price for the search step.
    #[arg(long)]
    pub(crate) max_price: Option<u64>,
    /// Skip the account and inquiry portion of the demo.
    #[arg(long)]
    pub(crate) skip_inquiry: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        listings,
        keywords,
        max_price,
        skip_inquiry,
    } = args;

    let (catalog, source) = match listings {
        Some(path) => {
            let listings = ListingImporter::from_path(&path)?;
            (listings, format!("CSV import ({})", path.display()))
        }
        None => (sample_listings(), "built-in samples".to_string()),
    };

    println!("Estate desk demo");
    println!("Data source: {} ({} listings)", source, catalog.len());
    let services = SiteServices::in_memory(catalog, DEFAULT_OPERATIONS_EMAIL);

    match services.catalog.landing() {
        Ok(landing) => {
            println!("\nFeatured listings");
            for listing in &landing.listings {
                print_listing(listing);
            }
        }
        Err(err) => println!("  Landing page unavailable: {}", err),
    }

    match services.catalog.index(None) {
        Ok(page) => println!(
            "\nCatalog index: page {} of {} ({} published listings, {} per page)",
            page.number, page.num_pages, page.count, page.per_page
        ),
        Err(err) => println!("  Catalog index unavailable: {}", err),
    }

    let params = SearchParams {
        keywords: Some(keywords.clone()),
        price: max_price.map(|price| price.to_string()),
        ..SearchParams::default()
    };
    let first_match = match services.catalog.search(params) {
        Ok(results) => {
            println!(
                "\nSearch for '{}'{}: {} match(es)",
                keywords,
                max_price
                    .map(|price| format!(" up to ${price}"))
                    .unwrap_or_default(),
                results.listings.len()
            );
            for listing in &results.listings {
                print_listing(listing);
            }
            results.listings.into_iter().next()
        }
        Err(ListingError::InvalidFilter(err)) => {
            println!("  Search rejected: {}", err);
            None
        }
        Err(err) => {
            println!("  Search unavailable: {}", err);
            None
        }
    };

    if skip_inquiry {
        return Ok(());
    }
    let Some(listing) = first_match else {
        println!("\nNo listing to inquire about; skipping inquiry walkthrough");
        return Ok(());
    };

    println!("\nAccount and inquiry walkthrough");
    let registration = RegistrationForm {
        first_name: "Jordan".to_string(),
        last_name: "Lee".to_string(),
        username: "jlee".to_string(),
        email: "jordan.lee@example.com".to_string(),
        password: "correct horse battery".to_string(),
        password2: "correct horse battery".to_string(),
    };
    let profile = match services.accounts.register(registration) {
        Ok(profile) => profile,
        Err(err) => {
            println!("  Registration rejected: {}", err);
            return Ok(());
        }
    };
    println!("- Registered {} (user {})", profile.username, profile.id);

    let session = match services.accounts.login(LoginForm {
        username: "jlee".to_string(),
        password: "correct horse battery".to_string(),
    }) {
        Ok(session) => session,
        Err(err) => {
            println!("  Login rejected: {}", err);
            return Ok(());
        }
    };
    println!("- Logged in as {}", session.user.username);

    let inquiry = InquiryForm {
        listing_id: listing.id,
        listing: listing.title.clone(),
        name: "Jordan Lee".to_string(),
        email: "jordan.lee@example.com".to_string(),
        phone: "555-0142".to_string(),
        message: "Is a viewing possible this weekend?".to_string(),
        user_id: None,
        realtor_email: listing.realtor_email().map(str::to_string),
    };
    for attempt in 1..=2 {
        match services
            .inquiries
            .submit(Some(session.user.id), inquiry.clone())
        {
            Ok(contact) => println!(
                "- Inquiry {} recorded for '{}' (attempt {})",
                contact.id, contact.listing, attempt
            ),
            Err(err) => println!("- Attempt {} rejected: {}", attempt, err),
        }
    }

    match services.accounts.dashboard(session.user.id) {
        Ok(dashboard) => {
            println!("\nDashboard for {}", dashboard.user.username);
            for contact in &dashboard.contacts {
                println!(
                    "  - {} on {}",
                    contact.listing,
                    contact.contact_date.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Err(err) => println!("  Dashboard unavailable: {}", err),
    }

    let events = services.outbox.events();
    if events.is_empty() {
        println!("\nNotifications: none queued");
    } else {
        println!("\nNotifications queued");
        for event in &events {
            println!("  - {} -> {}", event.subject, event.recipients.join(", "));
            println!("    {}", event.body);
        }
    }

    if let Err(err) = services.accounts.logout(&session.token) {
        println!("  Logout failed: {}", err);
    }

    Ok(())
}

fn print_listing(listing: &Listing) {
    println!(
        "  - #{} {} | {}, {} | ${} | {} bd / {} ba{}",
        listing.id,
        listing.title,
        listing.city,
        listing.state,
        listing.price,
        listing.bedrooms,
        listing.bathrooms,
        if listing.is_published { "" } else { " (unpublished)" }
    );
}

fn sample_date(days_ago: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
        - Duration::days(days_ago)
}

fn realtor(name: &str, email: &str) -> Option<Realtor> {
    Some(Realtor {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
    })
}

/// Small catalog used by the demo and the route tests.
pub(crate) fn sample_listings() -> Vec<Listing> {
    let rows: [(u64, &str, &str, &str, &str, u64, u32, f32, i64, bool); 8] = [
        (1, "45 Drivewood Circle", "Norwood", "MA", "Updated colonial with a renovated kitchen", 490_000, 4, 2.5, 1, true),
        (2, "12 Holiday Lane", "Boston", "MA", "Condo near the harbor with a rooftop deck", 525_000, 2, 2.0, 3, true),
        (3, "18 Oakwood Drive", "Salem", "MA", "Family home with a big yard and open kitchen", 380_000, 3, 1.5, 6, true),
        (4, "2 Harbor View", "Portland", "ME", "Waterfront cottage with original floors", 610_000, 3, 2.0, 9, true),
        (5, "77 Summit Road", "Concord", "NH", "Mountain views and a chef's kitchen", 720_000, 5, 3.5, 12, true),
        (6, "9 Elm Street", "Boston", "MA", "Brownstone flat awaiting renovation", 350_000, 2, 1.0, 15, true),
        (7, "301 Beacon Street", "Boston", "MA", "Penthouse with kitchen island and skyline views", 1_250_000, 3, 3.0, 2, false),
        (8, "64 Maple Avenue", "Worcester", "MA", "Starter home close to schools", 275_000, 3, 1.0, 20, true),
    ];

    rows.into_iter()
        .map(
            |(id, title, city, state, description, price, bedrooms, bathrooms, days_ago, is_published)| {
                Listing {
                    id: ListingId(id),
                    title: title.to_string(),
                    address: title.to_string(),
                    city: city.to_string(),
                    state: state.to_string(),
                    zipcode: String::new(),
                    description: description.to_string(),
                    price,
                    bedrooms,
                    bathrooms,
                    garage: 1,
                    sqft: 1_200 + 250 * bedrooms,
                    lot_size: 0.25,
                    realtor: if id % 2 == 0 {
                        realtor("Mark Hudson", "mark@estate-desk.local")
                    } else {
                        realtor("Kyle Brown", "kyle@estate-desk.local")
                    },
                    is_published,
                    list_date: sample_date(days_ago),
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_has_unique_ids_and_one_hidden_listing() {
        let listings = sample_listings();
        let mut ids: Vec<u64> = listings.iter().map(|listing| listing.id.0).collect();
        ids.dedup();
        assert_eq!(ids.len(), listings.len());
        assert_eq!(
            listings.iter().filter(|listing| !listing.is_published).count(),
            1
        );
    }

    #[test]
    fn demo_runs_end_to_end_on_samples() {
        run_demo(DemoArgs {
            keywords: "kitchen".to_string(),
            ..DemoArgs::default()
        })
        .expect("demo completes");
    }

    #[test]
    fn demo_runs_on_bundled_csv() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/listings.csv");
        run_demo(DemoArgs {
            listings: Some(path),
            keywords: "kitchen".to_string(),
            max_price: Some(500_000),
            skip_inquiry: false,
        })
        .expect("demo completes");
    }

    #[test]
    fn demo_surfaces_missing_csv_as_import_error() {
        let err = run_demo(DemoArgs {
            listings: Some(PathBuf::from("does/not/exist.csv")),
            ..DemoArgs::default()
        })
        .expect_err("missing file");
        assert!(matches!(err, AppError::Import(_)));
    }
}
