//! Built-in section type catalog.
//!
//! Twelve types ship with the platform; `feature-1` and `feature-2` are
//! optional extension types registered on demand.

use crate::sections::definition::{
    numbered_labels, ResolutionStrategy, SectionDefinition, POST_FETCH_ACTIONS,
};
use crate::sections::schema::{ConfigField, FieldKind, PreviewLayout, PreviewSchema, SlotField};

// ---------------------------------------------------------------------------
// Type identifiers
// ---------------------------------------------------------------------------

pub const HERO: &str = "hero";
pub const LATEST_UPDATES: &str = "latest-updates";
pub const FEATURED_PERSON: &str = "featured-person";
pub const SPREAD: &str = "spread";
pub const FEATURED_VIDEO: &str = "featured-video";
pub const REVIEW: &str = "review";
pub const RECIPE: &str = "recipe";
pub const ADD_TO_CART: &str = "add-to-cart";
pub const NEWSLETTER: &str = "newsletter";
pub const CUSTOM_HTML: &str = "custom-html";
pub const AD: &str = "ad";
pub const FEATURED_LOCATION: &str = "featured-location";
pub const FEATURE_1: &str = "feature-1";
pub const FEATURE_2: &str = "feature-2";

const DIVIDER_STYLES: &[&str] = &["none", "line", "dots", "wave"];
const GRID_COLUMNS: &[&str] = &["2", "3", "4"];

/// The twelve built-in definitions in catalog order.
pub fn builtin_definitions() -> Vec<SectionDefinition> {
    vec![
        hero(),
        latest_updates(),
        featured_person(),
        spread(),
        featured_video(),
        review(),
        recipe(),
        add_to_cart(),
        newsletter(),
        custom_html(),
        ad(),
        featured_location(),
    ]
}

/// Optional extension definitions.
pub fn extension_definitions() -> Vec<SectionDefinition> {
    vec![feature_1(), feature_2()]
}

// ---------------------------------------------------------------------------
// Shared slot schemas
// ---------------------------------------------------------------------------

fn with_post_slot_fields(def: SectionDefinition) -> SectionDefinition {
    def.slot_field("title", SlotField::new(FieldKind::Text, "Title"))
        .slot_field("description", SlotField::new(FieldKind::Textarea, "Description"))
        .slot_field("image", SlotField::new(FieldKind::Media, "Image"))
        .slot_field("url", SlotField::new(FieldKind::Text, "Link URL"))
        .slot_field("category", SlotField::new(FieldKind::Text, "Category label"))
        .slot_field("author", SlotField::new(FieldKind::Text, "Author"))
        .slot_field("date", SlotField::new(FieldKind::Text, "Date"))
}

/// A one-slot feature block driven by the four post fetch actions.
fn single_post(section_type: &str, name: &str) -> SectionDefinition {
    with_post_slot_fields(SectionDefinition::new(section_type, name))
        .slots(1, 1, 1)
        .slot_labels(["Featured post"])
        .actions(POST_FETCH_ACTIONS)
        .strategy(ResolutionStrategy::SingleSlot)
}

/// Carousel/grid hybrid with an optional intro card and a `count` knob.
fn card_grid(section_type: &str, name: &str, count: usize, min: usize, max: usize) -> SectionDefinition {
    with_post_slot_fields(SectionDefinition::new(section_type, name))
        .slots(count, min, max)
        .config("count", ConfigField::number("Items to show", count as i64))
        .config("showIntro", ConfigField::toggle("Show intro card", true))
        .config("introTitle", ConfigField::text("Intro title", ""))
        .config("introText", ConfigField::textarea("Intro text", ""))
        .config("dividerStyle", ConfigField::select("Divider style", DIVIDER_STYLES, "line"))
        .config("dividerColor", ConfigField::color("Divider color", "#e5e5e5"))
        .slot_labels(numbered_labels("Card", max))
        .actions(POST_FETCH_ACTIONS)
        .strategy(ResolutionStrategy::MultiSlot {
            count_field: Some("count"),
        })
}

// ---------------------------------------------------------------------------
// Built-in types
// ---------------------------------------------------------------------------

pub fn hero() -> SectionDefinition {
    single_post(HERO, "Hero")
        .description("Full-width lead story with a call-to-action button.")
        .icon("image")
        .config(
            "alignment",
            ConfigField::select("Text alignment", &["left", "center", "right"], "center"),
        )
        .config("bgColor", ConfigField::color("Background color", "black"))
        .config("buttonText", ConfigField::text("Button text", "Read More"))
        .config(
            "buttonColor",
            ConfigField::select("Button color", &["white", "black", "accent"], "white"),
        )
        .preview(
            PreviewSchema::new(PreviewLayout::Banner)
                .slot_area("image", 0)
                .slot_area("headline", 0)
                .area("button"),
        )
}

pub fn latest_updates() -> SectionDefinition {
    let mut labels = vec!["Featured".to_string()];
    labels.extend((2..=20).map(|n| format!("Post {n}")));

    with_post_slot_fields(SectionDefinition::new(LATEST_UPDATES, "Latest Updates"))
        .description("One featured story followed by a grid of recent posts.")
        .icon("newspaper")
        .slots(5, 2, 20)
        .config("title", ConfigField::text("Heading", "Latest Updates"))
        .config("featuredCount", ConfigField::number("Featured posts", 1))
        .config("postsCount", ConfigField::number("Grid posts", 4))
        .config("showViewAll", ConfigField::toggle("Show 'view all' link", true))
        .config("viewAllUrl", ConfigField::text("'View all' URL", "/latest"))
        .slot_labels(labels)
        .actions(POST_FETCH_ACTIONS)
        .strategy(ResolutionStrategy::MultiSlot { count_field: None })
        .preview(
            PreviewSchema::new(PreviewLayout::Split)
                .area("heading")
                .slot_area("featured", 0)
                .slot_area("grid-1", 1)
                .slot_area("grid-2", 2)
                .slot_area("grid-3", 3)
                .slot_area("grid-4", 4),
        )
}

pub fn featured_person() -> SectionDefinition {
    single_post(FEATURED_PERSON, "Featured Person")
        .description("Profile spotlight with portrait and pull quote.")
        .icon("user")
        .config("label", ConfigField::text("Label", "Featured"))
        .config(
            "layout",
            ConfigField::select("Layout", &["image-left", "image-right"], "image-left"),
        )
        .config("bgColor", ConfigField::color("Background color", "white"))
        .preview(
            PreviewSchema::new(PreviewLayout::Split)
                .slot_area("portrait", 0)
                .slot_area("quote", 0),
        )
}

pub fn spread() -> SectionDefinition {
    card_grid(SPREAD, "Spread", 4, 1, 12)
        .description("Horizontal carousel of stories with an intro card.")
        .icon("columns")
        .config("title", ConfigField::text("Heading", "The Spread"))
        .preview(
            PreviewSchema::new(PreviewLayout::Carousel)
                .area("intro")
                .slot_area("card-1", 0)
                .slot_area("card-2", 1)
                .slot_area("card-3", 2)
                .slot_area("card-4", 3),
        )
}

pub fn featured_video() -> SectionDefinition {
    single_post(FEATURED_VIDEO, "Featured Video")
        .description("A single embedded video with caption.")
        .icon("play")
        .config("autoplay", ConfigField::toggle("Autoplay", false))
        .config("showCaption", ConfigField::toggle("Show caption", true))
        .config(
            "aspectRatio",
            ConfigField::select("Aspect ratio", &["16:9", "4:3", "1:1"], "16:9"),
        )
        .preview(
            PreviewSchema::new(PreviewLayout::Stack)
                .slot_area("player", 0)
                .slot_area("caption", 0),
        )
}

pub fn review() -> SectionDefinition {
    card_grid(REVIEW, "Reviews", 3, 1, 9)
        .description("Grid of reviews with optional star ratings.")
        .icon("star")
        .config("title", ConfigField::text("Heading", "Reviews"))
        .config("showRating", ConfigField::toggle("Show rating", true))
        .config("columns", ConfigField::select("Columns", GRID_COLUMNS, "3"))
        .preview(
            PreviewSchema::new(PreviewLayout::Grid)
                .columns(3)
                .area("intro")
                .slot_area("review-1", 0)
                .slot_area("review-2", 1)
                .slot_area("review-3", 2),
        )
}

pub fn recipe() -> SectionDefinition {
    card_grid(RECIPE, "Recipes", 6, 2, 12)
        .description("Recipe cards with cook time, laid out as a grid.")
        .icon("utensils")
        .config("title", ConfigField::text("Heading", "Recipes"))
        .config("showCookTime", ConfigField::toggle("Show cook time", true))
        .config("columns", ConfigField::select("Columns", GRID_COLUMNS, "3"))
        .preview(
            PreviewSchema::new(PreviewLayout::Grid)
                .columns(3)
                .area("intro")
                .slot_area("recipe-1", 0)
                .slot_area("recipe-2", 1)
                .slot_area("recipe-3", 2)
                .slot_area("recipe-4", 3)
                .slot_area("recipe-5", 4)
                .slot_area("recipe-6", 5),
        )
}

pub fn add_to_cart() -> SectionDefinition {
    SectionDefinition::new(ADD_TO_CART, "Add to Cart")
        .description("Shoppable product row linking to affiliate listings.")
        .icon("shopping-cart")
        .slots(4, 1, 8)
        .config("title", ConfigField::text("Heading", "Shop the Story"))
        .config("buttonText", ConfigField::text("Button text", "Add to Cart"))
        .config("showPrice", ConfigField::toggle("Show price", true))
        .config("columns", ConfigField::select("Columns", GRID_COLUMNS, "4"))
        .slot_field("title", SlotField::new(FieldKind::Text, "Product name"))
        .slot_field("image", SlotField::new(FieldKind::Media, "Image"))
        .slot_field("url", SlotField::new(FieldKind::Text, "Product URL"))
        .slot_field("price", SlotField::new(FieldKind::Text, "Price"))
        .slot_labels(numbered_labels("Product", 8))
        .strategy(ResolutionStrategy::ProductSlots)
        .preview(
            PreviewSchema::new(PreviewLayout::Grid)
                .columns(4)
                .area("heading")
                .slot_area("product-1", 0)
                .slot_area("product-2", 1)
                .slot_area("product-3", 2)
                .slot_area("product-4", 3),
        )
}

pub fn newsletter() -> SectionDefinition {
    SectionDefinition::new(NEWSLETTER, "Newsletter")
        .description("Email sign-up form.")
        .icon("mail")
        .config("heading", ConfigField::text("Heading", "Stay in the loop"))
        .config(
            "subheading",
            ConfigField::textarea("Subheading", "The best stories, delivered weekly."),
        )
        .config("buttonText", ConfigField::text("Button text", "Subscribe"))
        .config("placeholder", ConfigField::text("Input placeholder", "Your email address"))
        .config("bgColor", ConfigField::color("Background color", "#f5f5f5"))
        .preview(
            PreviewSchema::new(PreviewLayout::Block)
                .area("heading")
                .area("form"),
        )
}

pub fn custom_html() -> SectionDefinition {
    SectionDefinition::new(CUSTOM_HTML, "Custom HTML")
        .description("Raw HTML block for embeds.")
        .icon("code")
        .config("html", ConfigField::textarea("HTML", ""))
        .config("fullWidth", ConfigField::toggle("Full width", false))
        .preview(PreviewSchema::new(PreviewLayout::Block).area("html"))
}

pub fn ad() -> SectionDefinition {
    SectionDefinition::new(AD, "Advertisement")
        .description("Ad placement resolved by the ad server.")
        .icon("megaphone")
        .config(
            "placement",
            ConfigField::select("Placement", &["leaderboard", "mpu", "billboard"], "leaderboard"),
        )
        .config("slotName", ConfigField::text("Ad unit name", "homepage-1"))
        .config("showLabel", ConfigField::toggle("Show 'Advertisement' label", true))
        .preview(PreviewSchema::new(PreviewLayout::Banner).area("ad"))
}

pub fn featured_location() -> SectionDefinition {
    single_post(FEATURED_LOCATION, "Featured Location")
        .description("A place-based story with a map.")
        .icon("map-pin")
        .config(
            "mapStyle",
            ConfigField::select("Map style", &["light", "dark", "satellite"], "light"),
        )
        .config("showAddress", ConfigField::toggle("Show address", true))
        .config("zoom", ConfigField::number("Map zoom", 12))
        .preview(
            PreviewSchema::new(PreviewLayout::Split)
                .area("map")
                .slot_area("story", 0),
        )
}

// ---------------------------------------------------------------------------
// Extension types
// ---------------------------------------------------------------------------

pub fn feature_1() -> SectionDefinition {
    single_post(FEATURE_1, "Feature (image left)")
        .description("Single story, image on the left.")
        .icon("layout-left")
        .config("showExcerpt", ConfigField::toggle("Show excerpt", true))
        .config("bgColor", ConfigField::color("Background color", "white"))
        .preview(
            PreviewSchema::new(PreviewLayout::Split)
                .slot_area("image", 0)
                .slot_area("text", 0),
        )
}

pub fn feature_2() -> SectionDefinition {
    single_post(FEATURE_2, "Feature (full bleed)")
        .description("Single story over a full-bleed image.")
        .icon("layout-full")
        .config("overlay", ConfigField::select("Overlay", &["none", "dark", "light"], "dark"))
        .config("buttonText", ConfigField::text("Button text", "Read More"))
        .preview(
            PreviewSchema::new(PreviewLayout::Banner)
                .slot_area("image", 0)
                .slot_area("text", 0),
        )
}
