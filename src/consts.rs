//! Site-wide constants shared by templates and the manifest

pub const SITE_TITLE: &str = "Vladislav Guleaev";

pub const SITE_DESCRIPTION: &str =
    "Personal Blog by Vladislav Guleaev. I write about web development, programming, and other tech stuff.";

pub const TWITTER_LINK: &str = "https://twitter.com/vguleaev1";
pub const LINKEDIN_LINK: &str = "https://www.linkedin.com/in/vladislav-guleaev-15503914a";
pub const GITHUB_LINK: &str = "https://github.com/vguleaev";

/// Base URL the site is deployed under
pub const SITE_URL: &str = "https://vguleaev.dev";

/// Social links in the order the footer renders them
pub fn social_links() -> [(&'static str, &'static str); 3] {
    [
        ("twitter", TWITTER_LINK),
        ("linkedin", LINKEDIN_LINK),
        ("github", GITHUB_LINK),
    ]
}
