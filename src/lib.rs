// Crate entry point. Declares the module tree so tests and the binary can import from the root.
//
// Layout
// - shared: value types and the backend contract every storage technology implements.
// - modules::persistence: the engine that stages, commits and replays event streams.
// - modules::dispatch: fan-out of one command to every handler able to process it.
// - shell: configuration and composition root.

pub mod shared {
    pub mod core {
        pub mod event_record;
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod event_store;
    }
}

pub mod modules {
    pub mod persistence {
        pub mod core {
            pub mod commit_log;
            pub mod event_stream;
            pub mod version;
        }
        pub mod engine;
        pub mod errors;
    }
    pub mod dispatch {
        pub mod dispatcher;
        pub mod handler;
    }
}

pub mod shell;
