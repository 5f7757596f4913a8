//! Demo route scheme used across Waypoint tests

use serde::{Deserialize, Serialize};
use waypoint_core::{Routes, Transition};

/// Screens of the demo application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    /// Landing screen
    Home,
    /// News feed
    Feed,
    /// Search entry
    Search,
    /// A single article
    Article {
        /// Article slug
        slug: String,
    },
    /// A user's profile
    Profile {
        /// User name
        user: String,
    },
    /// Settings root
    Settings,
    /// Full-screen photo, optionally animated from a thumbnail
    Photo {
        /// Photo index
        index: u32,
        /// Matched transition from the thumbnail
        transition: Transition,
    },
    /// Compose flow
    Compose,
    /// Onboarding flow shown before sign-in
    Onboarding,
}

impl Screen {
    /// Article screen for `slug`
    pub fn article(slug: impl Into<String>) -> Self {
        Self::Article { slug: slug.into() }
    }

    /// Profile screen for `user`
    pub fn profile(user: impl Into<String>) -> Self {
        Self::Profile { user: user.into() }
    }

    /// Photo screen without a transition
    pub fn photo(index: u32) -> Self {
        Self::Photo {
            index,
            transition: Transition::none(),
        }
    }
}

/// Tabs of the demo application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppTab {
    /// Feed tab
    Feed,
    /// Search tab
    Search,
    /// Profile tab
    Profile,
}

/// Sheet tags of the demo application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppSheet {
    /// Share sheet
    Share,
    /// Filter picker
    Filters,
}

/// Route scheme binding the demo types together.
#[derive(Debug)]
pub struct DemoRoutes;

impl Routes for DemoRoutes {
    type Destination = Screen;
    type TabTag = AppTab;
    type SheetTag = AppSheet;
}
