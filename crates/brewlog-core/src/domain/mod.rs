mod identity;
mod post;

pub use identity::Identity;
pub use post::{
    BeerDetails, BeerPost, BreweryDetails, BreweryPost, Comment, Coordinates, NewBeer, NewBrewery,
    Post, PostDetails, PostKind, Rating,
};
