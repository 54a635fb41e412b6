//! CDN redirect URL construction.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// File-server subdomain label (`s1.`, `s2.`, ..., `sN.`).
static FILE_SERVER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(s\d+)\.").expect("file server label pattern is valid"));

/// Rewrite a video URL onto the CDN host.
///
/// The leading `sN.` label of the video host becomes the first path segment
/// on the CDN; the original path is kept and the scheme comes from the CDN
/// host. Returns `None` when the video host carries no file-server label, in
/// which case the caller redirects to the unmodified origin URL.
pub fn rewrite_to_cdn(video: &Url, cdn_host: &Url) -> Option<Url> {
    let video_host = video.host_str()?;
    let label = FILE_SERVER_LABEL.captures(video_host)?.get(1)?.as_str();
    let target = format!(
        "{}://{}/{}{}",
        cdn_host.scheme(),
        cdn_host.host_str()?,
        label,
        video.path()
    );
    Url::parse(&target).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn test_preserves_file_server_label_and_path() {
        let video = url("http://s1.origin-cluster/video/123/file.m3u8");
        let cdn = url("http://cdn-domain");
        assert_eq!(
            rewrite_to_cdn(&video, &cdn).unwrap().as_str(),
            "http://cdn-domain/s1/video/123/file.m3u8"
        );
    }

    #[test]
    fn test_multi_digit_label() {
        let video = url("http://s14.origin-cluster/video/1/file.m3u8");
        let cdn = url("http://cdn-domain");
        assert_eq!(
            rewrite_to_cdn(&video, &cdn).unwrap().as_str(),
            "http://cdn-domain/s14/video/1/file.m3u8"
        );
    }

    #[test]
    fn test_scheme_comes_from_cdn_host() {
        let video = url("http://s1.origin-cluster/video/1/file.m3u8");
        let cdn = url("https://cdn-domain");
        assert_eq!(
            rewrite_to_cdn(&video, &cdn).unwrap().scheme(),
            "https"
        );
    }

    #[test]
    fn test_host_without_label_is_not_rewritten() {
        let video = url("http://origin-cluster/video/1/file.m3u8");
        let cdn = url("http://cdn-domain");
        assert!(rewrite_to_cdn(&video, &cdn).is_none());

        // label must be leading, not embedded
        let video = url("http://cluster.s1.example/video/1/file.m3u8");
        assert!(rewrite_to_cdn(&video, &cdn).is_none());
    }
}
