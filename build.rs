use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    // Stamp the binary so /health shows which build is actually serving.
    let build_id = std::env::var("PARTYOF4_BUILD_ID").ok().unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs().to_string())
            .unwrap_or_else(|_| "dev".to_string())
    });
    println!("cargo:rerun-if-env-changed=PARTYOF4_BUILD_ID");
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rustc-env=PARTYOF4_BUILD_ID={}", build_id);
}
