use crate::models::{slugify, Album, Author, Song, Track};

/// Group `songs` into the author → album → track hierarchy.
///
/// Authors, albums and tracks appear in the order they are first met in the
/// input, and songs keep their relative order inside a track.
pub fn build_hierarchy(songs: &[Song]) -> Vec<Author> {
    let mut authors: Vec<Author> = Vec::new();

    for song in songs {
        let author_idx = match authors.iter().position(|a| a.name == song.author) {
            Some(idx) => idx,
            None => {
                authors.push(Author {
                    id: slugify(&song.author),
                    name: song.author.clone(),
                    albums: Vec::new(),
                });
                authors.len() - 1
            }
        };
        let author = &mut authors[author_idx];

        let album_idx = match author.albums.iter().position(|a| a.name == song.album) {
            Some(idx) => idx,
            None => {
                author.albums.push(Album {
                    id: slugify(&song.album),
                    name: song.album.clone(),
                    tracks: Vec::new(),
                });
                author.albums.len() - 1
            }
        };
        let album = &mut author.albums[album_idx];

        match album.tracks.iter_mut().find(|t| t.name == song.track) {
            Some(track) => track.songs.push(song.clone()),
            None => album.tracks.push(Track {
                id: slugify(&song.track),
                name: song.track.clone(),
                songs: vec![song.clone()],
            }),
        }
    }

    authors
}
