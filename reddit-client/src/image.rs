//! Direct-image detection for post URLs.

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

// The two imgur page patterns here never match: every imgur.com URL is
// decided by the imgur check before this list is consulted.
const IMAGE_HOSTS: [&str; 5] = [
    "i.redd.it",
    "i.imgur.com",
    "imgur.com/a/",
    "imgur.com/gallery/",
    "preview.redd.it",
];

/// Returns true when `url` looks like a directly viewable image.
///
/// Any imgur.com URL that is not an album (`/a/`) or gallery page counts as
/// an image, including plain imgur pages.
pub fn is_image_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    let url_lower = url.to_lowercase();

    if IMAGE_EXTENSIONS.iter().any(|ext| url_lower.ends_with(ext)) {
        return true;
    }

    if url_lower.contains("imgur.com") {
        return !(url_lower.contains("/a/") || url_lower.contains("/gallery/"));
    }

    IMAGE_HOSTS.iter().any(|host| url_lower.contains(host))
}
