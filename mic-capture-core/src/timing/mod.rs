pub mod song_timing;
