error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Csv(::csv::Error);
    }

    errors {
        InvalidAddress(input: String, reason: String) {
            description("invalid MAC address")
            display("{} is not a valid MAC address ({})", input, reason)
        }

        VendorNotFound(mac: String) {
            description("vendor not found")
            display("The vendor for MAC {} could not be found. \
                     Either it's not registered or the local list is out of date", mac)
        }

        TransportError(cause: String) {
            description("unable to reach the registry server")
            display("Unable to connect to the server: {}", cause)
        }

        UpstreamError(status: u16, reason: String) {
            description("registry server returned an error")
            display("Registry server returned an error\n{}: {}", status, reason)
        }

        CacheCorrupt(path: String, line: usize) {
            description("malformed vendor cache")
            display("Vendor cache {} is malformed at line {}", path, line)
        }

        CacheMissing(candidates: String) {
            description("no vendor cache")
            display("No vendor cache found (looked in {})", candidates)
        }
    }
}
