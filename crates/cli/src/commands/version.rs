/// Version banner. Commit and build date are stamped in by release builds
/// through `GCPHCP_GIT_COMMIT` and `GCPHCP_BUILD_DATE`.
pub fn version_text() -> String {
    format!(
        "gcphcp {}\n  commit:  {}\n  built:   {}\n  os/arch: {}/{}\n",
        env!("CARGO_PKG_VERSION"),
        option_env!("GCPHCP_GIT_COMMIT").unwrap_or("unknown"),
        option_env!("GCPHCP_BUILD_DATE").unwrap_or("unknown"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}
