//! Marketplace listing cards.
//!
//! The card's badge depends only on the kind of listing, so the kind is a
//! closed enum and every rendering decision is an exhaustive match.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Goods,
    Service,
    LookingForWork,
    JobPost,
}

impl ListingKind {
    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Goods => "For Sale",
            ListingKind::Service => "Service",
            ListingKind::LookingForWork => "Looking for Work",
            ListingKind::JobPost => "Job Available",
        }
    }

    /// Badge style classes used by the web frontend.
    pub fn badge_class(self) -> &'static str {
        match self {
            ListingKind::Goods => "bg-blue-100 text-blue-700",
            ListingKind::Service => "bg-green-100 text-green-700",
            ListingKind::LookingForWork => "bg-purple-100 text-purple-700",
            ListingKind::JobPost => "bg-orange-100 text-orange-700",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOwner {
    pub name: String,
    pub rating: f32,
    pub rating_count: u32,
    pub verified: bool,
}

impl ListingOwner {
    /// First character of the name, shown in the avatar bubble.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1} ({})", self.rating, self.rating_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub location: String,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub user: ListingOwner,
    pub created_at: String,
    pub views: u32,
    #[serde(rename = "type")]
    pub kind: ListingKind,
}

impl Listing {
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Price with the cedi sign, when the listing has one.
    pub fn price_label(&self) -> Option<String> {
        self.price.as_ref().map(|price| format!("₵{price}"))
    }

    /// The id as shown on the card: at most its first 8 characters.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }
}

/// "Today", "Yesterday", or "N days ago" for a listing `days` old.
pub fn age_label(days: u64) -> Cow<'static, str> {
    match days {
        0 => Cow::Borrowed("Today"),
        1 => Cow::Borrowed("Yesterday"),
        n => Cow::Owned(format!("{n} days ago")),
    }
}
