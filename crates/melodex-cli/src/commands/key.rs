use melodex_core::identity::{identity_key, normalize_artist, normalize_title, primary_artist};

/// Print the identity key for an artist/title pair.
pub fn show_key(artist: &str, title: &str) {
    log::debug!("Primary artist of {:?}: {:?}", artist, primary_artist(artist));
    println!("{}", identity_key(artist, title));
    println!("  artist: {}", normalize_artist(artist));
    println!("  title:  {}", normalize_title(title));
}
