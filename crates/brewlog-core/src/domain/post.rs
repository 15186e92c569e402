use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two post types, also the remote table names and the type-tag stored
/// on child rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Beers,
    Breweries,
}

impl PostKind {
    /// The remote table this kind is stored in.
    pub fn table_name(self) -> &'static str {
        match self {
            PostKind::Beers => "beers",
            PostKind::Breweries => "breweries",
        }
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// One user's rating of a post. At most one exists per (post, author) pair;
/// see [`Post::upsert_rating`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: Uuid,
    pub value: u8,
}

/// A comment on a post. Immutable once created; removed only when the post
/// itself is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Kind-specific attributes of a post.
pub trait PostDetails: Clone + Send + Sync + 'static {
    const KIND: PostKind;

    /// Named field lookup for the filter engine, value coerced to text.
    fn field(&self, name: &str) -> Option<String>;
}

/// Beer-specific attributes. `style` travels on the wire as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeerDetails {
    pub brewery: String,
    pub nation: String,
    #[serde(rename = "type")]
    pub style: String,
    pub abv: f32,
    pub price: f32,
}

impl PostDetails for BeerDetails {
    const KIND: PostKind = PostKind::Beers;

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "brewery" => Some(self.brewery.clone()),
            "nation" => Some(self.nation.clone()),
            "type" => Some(self.style.clone()),
            "abv" => Some(self.abv.to_string()),
            "price" => Some(self.price.to_string()),
            _ => None,
        }
    }
}

/// Brewery-specific attributes. Coordinates are assigned by the update
/// engine at creation time, never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreweryDetails {
    pub address: String,
    pub city: String,
    pub nation: String,
    pub lat: f64,
    pub lng: f64,
}

impl PostDetails for BreweryDetails {
    const KIND: PostKind = PostKind::Breweries;

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "address" => Some(self.address.clone()),
            "city" => Some(self.city.clone()),
            "nation" => Some(self.nation.clone()),
            _ => None,
        }
    }
}

/// A reviewable post with its denormalized children, as fetched from the
/// remote store (one row joined with its ratings and comments).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post<D> {
    pub id: i64,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(flatten)]
    pub details: D,
}

pub type BeerPost = Post<BeerDetails>;
pub type BreweryPost = Post<BreweryDetails>;

impl<D: PostDetails> Post<D> {
    /// Named field lookup for the filter engine. Common fields first, then
    /// the kind-specific ones.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "description" => self.description.clone(),
            _ => self.details.field(name),
        }
    }

    /// Arithmetic mean of the rating values; 0.0 for an unrated post.
    pub fn average_rating(&self) -> f32 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.ratings.iter().map(|r| u32::from(r.value)).sum();
        sum as f32 / self.ratings.len() as f32
    }

    /// Insert-or-replace keyed by author: any prior rating by the same user
    /// is dropped before the new one is appended.
    pub fn upsert_rating(&mut self, rating: Rating) {
        self.ratings.retain(|r| r.user_id != rating.user_id);
        self.ratings.push(rating);
    }

    /// Prepend a comment so the list stays newest-first.
    pub fn prepend_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

/// User-supplied fields for a new beer post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBeer {
    pub name: String,
    pub brewery: String,
    pub nation: String,
    pub style: String,
    pub abv: f32,
    pub price: f32,
    pub description: Option<String>,
}

/// User-supplied fields for a new brewery post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBrewery {
    pub name: String,
    pub address: String,
    pub city: String,
    pub nation: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beer(ratings: Vec<Rating>) -> BeerPost {
        Post {
            id: 1,
            name: "Test".to_string(),
            image_url: String::new(),
            description: None,
            created_at: Utc::now(),
            user_id: None,
            ratings,
            comments: Vec::new(),
            details: BeerDetails {
                brewery: "B".to_string(),
                nation: "IT".to_string(),
                style: "IPA".to_string(),
                abv: 5.0,
                price: 4.0,
            },
        }
    }

    #[test]
    fn test_average_of_three_ratings() {
        let user = Uuid::new_v4;
        let post = beer(vec![
            Rating { user_id: user(), value: 3 },
            Rating { user_id: user(), value: 4 },
            Rating { user_id: user(), value: 5 },
        ]);
        assert_eq!(post.average_rating(), 4.0);
    }

    #[test]
    fn test_average_of_no_ratings_is_zero() {
        assert_eq!(beer(Vec::new()).average_rating(), 0.0);
    }

    #[test]
    fn test_upsert_rating_replaces_same_author() {
        let author = Uuid::new_v4();
        let mut post = beer(Vec::new());
        post.upsert_rating(Rating { user_id: author, value: 2 });
        post.upsert_rating(Rating { user_id: author, value: 5 });

        assert_eq!(post.ratings.len(), 1);
        assert_eq!(post.ratings[0].value, 5);
    }

    #[test]
    fn test_upsert_rating_keeps_other_authors() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut post = beer(vec![Rating { user_id: a, value: 3 }]);
        post.upsert_rating(Rating { user_id: b, value: 4 });
        assert_eq!(post.ratings.len(), 2);
    }

    #[test]
    fn test_prepend_comment_is_newest_first() {
        let mut post = beer(Vec::new());
        for text in ["older", "newer"] {
            post.prepend_comment(Comment {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                user_email: "a@b.c".to_string(),
                text: text.to_string(),
                created_at: Utc::now(),
            });
        }
        assert_eq!(post.comments[0].text, "newer");
        assert_eq!(post.comments[1].text, "older");
    }

    #[test]
    fn test_wire_row_deserializes_without_children() {
        let row = serde_json::json!({
            "id": 7,
            "name": "Lager",
            "imageUrl": "https://example.com/x.jpg",
            "created_at": "2024-05-01T12:00:00Z",
            "user_id": null,
            "brewery": "Acme",
            "nation": "DE",
            "type": "Lager",
            "abv": 4.8,
            "price": 3.5
        });
        let post: BeerPost = serde_json::from_value(row).unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.details.style, "Lager");
        assert!(post.ratings.is_empty());
        assert!(post.comments.is_empty());
    }
}
