//! Built-in sample dataset.
//!
//! Used as the degraded-data fallback when the remote store has no rows
//! for a kind or cannot be reached at all, so the application stays usable
//! offline or unconfigured. Sample posts have no owner, so nobody but an
//! admin can delete them.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{BeerDetails, BeerPost, BreweryDetails, BreweryPost, Post, Rating};

fn taster(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn sample_beers() -> Vec<BeerPost> {
    let now = Utc::now();
    vec![
        Post {
            id: 1,
            name: "Nastro Dorato".to_string(),
            image_url: String::new(),
            description: Some("Crisp golden lager with a light malt body.".to_string()),
            created_at: now,
            user_id: None,
            ratings: vec![
                Rating { user_id: taster(1), value: 4 },
                Rating { user_id: taster(2), value: 5 },
            ],
            comments: Vec::new(),
            details: BeerDetails {
                brewery: "Birrificio del Borgo".to_string(),
                nation: "Italy".to_string(),
                style: "Lager".to_string(),
                abv: 5.0,
                price: 4.5,
            },
        },
        Post {
            id: 2,
            name: "IPA Session".to_string(),
            image_url: String::new(),
            description: Some("Citrus-forward session IPA, easy drinking.".to_string()),
            created_at: now,
            user_id: None,
            ratings: vec![Rating { user_id: taster(3), value: 4 }],
            comments: Vec::new(),
            details: BeerDetails {
                brewery: "Cloudwater".to_string(),
                nation: "United Kingdom".to_string(),
                style: "IPA".to_string(),
                abv: 4.2,
                price: 5.8,
            },
        },
        Post {
            id: 3,
            name: "Notte Fonda".to_string(),
            image_url: String::new(),
            description: Some("Imperial stout, coffee and dark chocolate.".to_string()),
            created_at: now,
            user_id: None,
            ratings: Vec::new(),
            comments: Vec::new(),
            details: BeerDetails {
                brewery: "Birra Perugia".to_string(),
                nation: "Italy".to_string(),
                style: "Imperial Stout".to_string(),
                abv: 9.5,
                price: 7.0,
            },
        },
    ]
}

pub fn sample_breweries() -> Vec<BreweryPost> {
    let now = Utc::now();
    vec![
        Post {
            id: 1,
            name: "Birrificio del Borgo".to_string(),
            image_url: String::new(),
            description: Some("Craft pioneer in the hills north of Rome.".to_string()),
            created_at: now,
            user_id: None,
            ratings: vec![Rating { user_id: taster(1), value: 5 }],
            comments: Vec::new(),
            details: BreweryDetails {
                address: "Via Provinciale 2".to_string(),
                city: "Borgorose".to_string(),
                nation: "Italy".to_string(),
                lat: 42.1925,
                lng: 13.2335,
            },
        },
        Post {
            id: 2,
            name: "Mastri Birrai & Co.".to_string(),
            image_url: String::new(),
            description: None,
            created_at: now,
            user_id: None,
            ratings: Vec::new(),
            comments: Vec::new(),
            details: BreweryDetails {
                address: "Piazza Navona 12".to_string(),
                city: "Roma".to_string(),
                nation: "Italy".to_string(),
                lat: 41.8992,
                lng: 12.4731,
            },
        },
    ]
}
