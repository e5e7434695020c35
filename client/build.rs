fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the shared proto directory (../proto relative to client/).
    // This ensures clients use the same protos as the servers.
    let proto_root = "../proto";

    println!("cargo:rerun-if-changed={}", proto_root);

    let protos: Vec<String> = vec![
        format!("{}/warung/inventory.proto", proto_root),
        format!("{}/warung/kitchen.proto", proto_root),
        format!("{}/warung/loyalty.proto", proto_root),
        format!("{}/warung/order.proto", proto_root),
        format!("{}/warung/supplier.proto", proto_root),
    ];

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&protos, &[proto_root])?;

    Ok(())
}
