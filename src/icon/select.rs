use crate::config::Config;
use crate::icon::Icon;

/// Picks the icon that best matches the configured preferences
///
/// # Selection Rules
///
/// 1. With `allow_svg`, an SVG wins outright; among several SVGs the one with
///    the lexicographically smallest URL is returned
/// 2. SVGs are never returned when `allow_svg` is false, not even as a
///    fallback: an SVG is not treated as a 0×0 bitmap, so a page whose only
///    icon is an SVG yields `None` in that case
/// 3. With `square_only`, icons whose width differs from their height are
///    discarded
/// 4. The smallest icon at least `target_height` tall is returned
/// 5. Failing that, the tallest remaining icon is returned
///
/// Ties keep the earliest icon in `icons`.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use icon_scraper::{icon::select, Config, Icon};
///
/// let icon = |height: u32| Icon {
///     url: format!("https://example.com/{}.png", height),
///     mime: "image/png".to_string(),
///     width: Some(height),
///     height: Some(height),
///     source: Bytes::new(),
/// };
/// let config = Config { target_height: 150, ..Config::default() };
/// let icons = vec![icon(400), icon(128), icon(600)];
/// assert_eq!(select(&config, &icons).unwrap().height, Some(400));
/// ```
pub fn select<'a>(config: &Config, icons: &'a [Icon]) -> Option<&'a Icon> {
    if config.allow_svg {
        let best_svg = icons
            .iter()
            .filter(|icon| icon.is_svg())
            .min_by(|a, b| a.url.cmp(&b.url));
        if best_svg.is_some() {
            return best_svg;
        }
    }

    let mut smallest_acceptable: Option<(&Icon, u32)> = None;
    let mut largest: Option<(&Icon, u32)> = None;

    for icon in icons {
        let (width, height) = match (icon.width, icon.height) {
            (Some(width), Some(height)) if !icon.is_svg() => (width, height),
            _ => continue,
        };

        if config.square_only && width != height {
            continue;
        }

        if height >= config.target_height
            && smallest_acceptable.map_or(true, |(_, best)| height < best)
        {
            smallest_acceptable = Some((icon, height));
        }

        if largest.map_or(true, |(_, best)| height > best) {
            largest = Some((icon, height));
        }
    }

    smallest_acceptable.or(largest).map(|(icon, _)| icon)
}
