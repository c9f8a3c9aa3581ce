use once_cell::sync::Lazy;
use regex::Regex;

// @module: Movie title extraction from release-style file names

// @const: Patterns removed from a file name, applied in order
static VIDEO_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mp4|mkv|avi|mov|wmv|flv|webm|m4v|3gp)$").unwrap()
});
static RESOLUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(720p|1080p|2160p|4k|uhd|hd|sd)\b").unwrap()
});
static CODEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(x264|x265|h264|h265|hevc|avc|xvid|divx)\b").unwrap()
});
static RELEASE_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bluray|brrip|bdrip|web-dl|webrip|hdtv|dvdrip|cam|ts|tc)\b").unwrap()
});
static RELEASE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[.*?\]").unwrap()
});
static YEAR_WITH_PARENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?\b(19|20)[0-9]{2}\b\)?").unwrap()
});
static YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(19|20)[0-9]{2}\b").unwrap()
});
static SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[._-]+").unwrap()
});
static SPECIAL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9\s]").unwrap()
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9]").unwrap()
});

/// Reduce a release file name to the bare movie title
///
/// `The.Matrix.1999.1080p.BluRay.x264-[GROUP].mkv` becomes `The Matrix`.
pub fn clean_movie_name(file_name: &str) -> String {
    let name = VIDEO_EXTENSION.replace(file_name, "");
    let name = RESOLUTION.replace_all(&name, "");
    let name = CODEC.replace_all(&name, "");
    let name = RELEASE_SOURCE.replace_all(&name, "");
    let name = RELEASE_GROUP.replace_all(&name, "");
    let name = YEAR_WITH_PARENS.replace_all(&name, "");
    let name = SEPARATORS.replace_all(&name, " ");
    let name = SPECIAL_CHARS.replace_all(&name, "");
    let name = WHITESPACE.replace_all(&name, " ");
    name.trim().to_string()
}

/// First plausible release year (1900-2099) in a file name
pub fn extract_year(file_name: &str) -> Option<String> {
    YEAR.find(file_name).map(|m| m.as_str().to_string())
}

/// Query for a subtitle search: the cleaned title followed by the year, if any
pub fn search_query(file_name: &str) -> String {
    if file_name.is_empty() {
        return String::new();
    }

    let title = clean_movie_name(file_name);
    match extract_year(file_name) {
        Some(year) => format!("{} {}", title, year),
        None => title,
    }
}

/// File name for a translated subtitle of the given movie
pub fn translated_file_name(movie_name: &str) -> String {
    format!("{}_translated.srt", NON_ALPHANUMERIC.replace_all(movie_name, "_"))
}
