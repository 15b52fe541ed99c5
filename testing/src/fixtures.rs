//! Canned products, keywords and descriptions

use copy_refinery_core::{CorpusPool, KeywordSet, ProductAttributes};

/// The Wireless Mouse product used across end-to-end tests
///
/// # Panics
///
/// Never in practice: the hardcoded record is valid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn wireless_mouse() -> ProductAttributes {
    ProductAttributes::new(
        "Wireless Mouse",
        vec![
            "ergonomic".to_string(),
            "2.4GHz".to_string(),
            "silent click".to_string(),
        ],
        "office workers",
    )
    .expect("hardcoded product should always be valid")
}

/// Keywords for [`wireless_mouse`]
#[must_use]
pub fn wireless_mouse_keywords() -> KeywordSet {
    KeywordSet::new(["wireless mouse", "ergonomic design"])
}

/// A short, flat description that scores poorly on length and structure
pub const FLAT_DESCRIPTION: &str = "This wireless mouse is good. It has an ergonomic design and works well.";

/// A structured description in the 100 to 150 word band
pub const STRUCTURED_DESCRIPTION: &str = "Meet the wireless mouse that keeps up with a busy office day.\n\n\
Why it works:\n\
- Ergonomic design that supports a relaxed, natural grip\n\
- Silent click buttons, so calls and shared spaces stay quiet\n\
- Fast 2.4GHz connection through a tiny plug-in receiver\n\n\
Office workers spend hours with a hand on the mouse, so comfort matters. \
The sculpted shell fits the palm, the scroll wheel moves smoothly, and the sensor tracks \
precisely on most desks. Setup takes seconds. Plug in the receiver, switch it on, and start \
working. The battery lasts for months, and the mouse sleeps when idle to save power. \
Light enough for a laptop bag and sturdy enough for daily use, it is an easy upgrade \
for anyone who wants a calmer, more comfortable workspace. Pick one up for your desk today.";

/// A small corpus of existing product copy
#[must_use]
pub fn sample_corpus() -> CorpusPool {
    CorpusPool::from(vec![
        "A compact keyboard with quiet keys, backlighting, and a slim profile for travel.".to_string(),
        "This desk lamp offers warm light, three brightness levels, and a flexible arm.".to_string(),
        "Noise cancelling headphones with deep bass, long battery life, and soft ear cushions."
            .to_string(),
    ])
}
