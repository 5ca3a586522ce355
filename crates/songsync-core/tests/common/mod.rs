pub mod song_server;
