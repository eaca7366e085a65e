error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }

    foreign_links {
        Io(std::io::Error);
        Json(serde_json::Error);
        Consensus(bitcoin::consensus::encode::Error);
    }

    errors {
        DbSync {
            description("mempool height does not match the flushed DB height")
            display("mempool/DB height mismatch, waiting for DB to sync")
        }
        Daemon(method: String) {
            description("daemon RPC call failed")
            display("daemon RPC call '{}' failed", method)
        }
    }
}
