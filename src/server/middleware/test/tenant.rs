use super::*;

async fn extract(header: Option<&str>) -> Result<Tenant, AuthError> {
    let mut builder = Request::builder().uri("/api/refs");
    if let Some(value) = header {
        builder = builder.header(TENANT_HEADER, value);
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();

    Tenant::from_request_parts(&mut parts, &()).await
}

/// Tests resolving the tenant from the upstream header.
///
/// Expected: Ok with the header's tenant id
#[tokio::test]
async fn resolves_tenant_from_header() {
    let Tenant(tenant) = extract(Some("5f1b2c3d4e")).await.unwrap();

    assert_eq!(tenant.as_str(), "5f1b2c3d4e");
}

/// Tests a request that upstream auth did not tag.
///
/// Expected: Err(AuthError::MissingTenant)
#[tokio::test]
async fn rejects_request_without_header() {
    assert!(matches!(extract(None).await, Err(AuthError::MissingTenant)));
}

/// Tests a header that would escape the tenant directories.
///
/// Expected: Err(AuthError::InvalidTenant)
#[tokio::test]
async fn rejects_path_like_tenant() {
    assert!(matches!(
        extract(Some("../tenant-b")).await,
        Err(AuthError::InvalidTenant(_))
    ));
}
