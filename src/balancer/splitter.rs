//! Deterministic ratio-to-decision function.

use crate::config::ratio::RedirectRatio;

/// Decide whether the request at `request_index` is redirected to the CDN.
///
/// The sequence repeats over a block of `cdn + origin` positions. Within a
/// block the minority side is spaced every `floor(1 + major/minor)`-th
/// position (1-based), which interleaves the two targets instead of grouping
/// them: ratio 3:1 yields CDN, CDN, CDN, origin rather than three CDNs up
/// front.
///
/// Pure and total over every `request_index >= 0`; the ratio type guarantees
/// positive counts.
pub fn should_redirect_to_cdn(request_index: u64, ratio: RedirectRatio) -> bool {
    let cdn = u64::from(ratio.cdn());
    let origin = u64::from(ratio.origin());
    let relative_index = request_index % u64::from(ratio.block());

    if cdn >= origin {
        let origin_every = 1 + cdn / origin;
        (relative_index + 1) % origin_every != 0
    } else {
        let cdn_every = 1 + origin / cdn;
        (relative_index + 1) % cdn_every == 0
    }
}
