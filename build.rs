fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fall back to the bundled compiler when the host has none configured.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure()
        .type_attribute(".user", "#[derive(serde::Serialize, serde::Deserialize)]")
        .field_attribute(".user.GetUserRequest.user_id", "#[serde(default)]")
        .field_attribute(".user.CreateUserRequest.name", "#[serde(default)]")
        .field_attribute(".user.CreateUserRequest.email", "#[serde(default)]")
        .compile_protos(&["src/proto/user.proto"], &["src/proto"])?;

    println!("cargo:rerun-if-changed=src/proto/user.proto");
    Ok(())
}
