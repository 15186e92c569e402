//! GPX waypoint export for the external map surface.
//!
//! The map viewer is fed a minimal GPX 1.1 document listing the currently
//! visible breweries plus, when known, the user's own position. Pure
//! string building, no state.

use crate::domain::{BreweryPost, Coordinates};

const USER_WAYPOINT_NAME: &str = "Your location";

/// Serialize breweries (and optionally the user's position) into a GPX
/// waypoint document. Ampersands in names are escaped to keep the XML
/// well-formed; brewery names are the only free-text that reaches it.
pub fn waypoint_document(breweries: &[BreweryPost], user_location: Option<Coordinates>) -> String {
    let user_wpt = user_location
        .map(|c| {
            format!(
                "<wpt lat=\"{}\" lon=\"{}\"><name>{}</name></wpt>",
                c.lat, c.lng, USER_WAYPOINT_NAME
            )
        })
        .unwrap_or_default();

    let brewery_wpts: String = breweries
        .iter()
        .map(|b| {
            format!(
                "<wpt lat=\"{}\" lon=\"{}\"><name>{}</name></wpt>",
                b.details.lat,
                b.details.lng,
                b.name.replace('&', "&amp;")
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>\n\
         <gpx xmlns=\"http://www.topografix.com/GPX/1/1\" version=\"1.1\" creator=\"Brewlog\">\n\
         \x20 <metadata><name>Breweries</name></metadata>\n\
         \x20 {user_wpt}\n\
         \x20 {brewery_wpts}\n\
         </gpx>"
    )
}
