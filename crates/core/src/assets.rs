//! Static images and links the page refers to by fixed path.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub url: String,
    /// Width and height in screen pixels
    pub size: [u32; 2],
}

impl Icon {
    pub fn new(url: impl Into<String>, size: [u32; 2]) -> Self {
        Self {
            url: url.into(),
            size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageAssets {
    pub you_are_here: Icon,
    pub bus_stop: Icon,
    pub background: String,
    pub logo: String,
    pub bus_badge: String,
    pub home: Link,
}

impl Default for PageAssets {
    fn default() -> Self {
        Self {
            you_are_here: Icon::new("/placeholder.png", [32, 32]),
            bus_stop: Icon::new("/bus.png", [32, 32]),
            background: "/bg.png".to_owned(),
            logo: "/logoo.png".to_owned(),
            bus_badge: "/autobus.png".to_owned(),
            home: Link {
                label: "Home".to_owned(),
                href: "./".to_owned(),
                icon: "/direction-gauche.png".to_owned(),
            },
        }
    }
}
