//! Filesystem creation and operations through the manager

mod common;

use std::time::{Duration, SystemTime};

use anyhow::Result;
use cluster_vfs::vfs::{Capability, FileSystemOptions, FileType, HDFS_CAPABILITIES};
use cluster_vfs::ClusterVfsError;
use common::Deployment;

#[tokio::test]
async fn test_create_filesystem_for_registered_host() -> Result<()> {
    let deployment = Deployment::standard()?;

    let (fs, name) = deployment
        .manager
        .resolve("hdfs://nn-a:8020/data/in", &FileSystemOptions::new())?;
    assert_eq!(fs.cluster().name, "clusterA");
    assert_eq!(fs.root_uri(), "hdfs://nn-a:8020/");
    assert_eq!(name.path, "/data/in");
    Ok(())
}

#[tokio::test]
async fn test_filesystem_operations_round_trip() -> Result<()> {
    let deployment = Deployment::standard()?;
    let options = FileSystemOptions::new();
    let (fs, _) = deployment.manager.resolve("hdfs://nn-a:8020/", &options)?;

    fs.create_folder("/data/in").await?;
    fs.write("/data/in/a.csv", b"id,value\n1,2\n", false).await?;

    assert_eq!(fs.file_type("/data/in").await?, FileType::Folder);
    assert_eq!(fs.file_type("/data/in/a.csv").await?, FileType::File);
    assert_eq!(fs.file_type("/data/missing").await?, FileType::Imaginary);
    assert_eq!(&fs.read_at("/data/in/a.csv", 3, 5).await?[..], b"value");

    fs.rename("/data/in/a.csv", "/data/in/b.csv").await?;
    let children = fs.list_children("/data/in").await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name(), "b.csv");

    assert!(fs.delete("/data", true).await?);
    assert!(!fs.delete("/data", true).await?);
    assert!(!fs.exists("/data").await?);
    Ok(())
}

#[tokio::test]
async fn test_clusters_on_same_host_share_backend() -> Result<()> {
    let deployment = Deployment::standard()?;
    let options = FileSystemOptions::new();

    let (first, _) = deployment.manager.resolve("hdfs://nn-a:8020/", &options)?;
    first.write("/shared.txt", b"hello", false).await?;

    // A second, independent filesystem for the same host sees the write
    let (second, _) = deployment.manager.resolve("hdfs://nn-a/", &options)?;
    assert_eq!(&second.read("/shared.txt").await?[..], b"hello");
    Ok(())
}

#[tokio::test]
async fn test_unknown_host_uses_template_and_default_shim() -> Result<()> {
    let deployment = Deployment::standard()?;

    let (fs, _) = deployment
        .manager
        .resolve("hdfs://adhoc-nn:9000/", &FileSystemOptions::new())?;
    assert!(fs.cluster().is_template());
    assert_eq!(fs.cluster().hdfs_host, "adhoc-nn");
    assert_eq!(fs.cluster().hdfs_port, "9000");
    Ok(())
}

#[test]
fn test_missing_shim_is_cluster_initialization_error() -> Result<()> {
    let deployment = Deployment::standard()?;

    let err = deployment
        .manager
        .resolve("hdfs://old-nn/", &FileSystemOptions::new())
        .unwrap_err();
    match err {
        ClusterVfsError::ClusterInitialization(e) => {
            assert_eq!(e.cluster, "legacy");
            assert!(e.reason.contains("cdh5"));
        }
        other => panic!("expected cluster initialization error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_uri_without_host_never_binds_hostless_cluster() -> Result<()> {
    let deployment = Deployment::from_yaml(
        r#"
installed_shims: [hdp30]
cluster_defaults:
  shim: hdp30
clusters:
  - name: hostless
  - name: real
    hdfs_host: nn
"#,
    )?;

    let err = deployment
        .manager
        .resolve("hdfs:///data", &FileSystemOptions::new())
        .unwrap_err();
    match err {
        // The template has no host, so the locator refuses it
        ClusterVfsError::ClusterInitialization(e) => assert_eq!(e.cluster, ""),
        other => panic!("expected cluster initialization error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unregistered_scheme() -> Result<()> {
    let deployment = Deployment::standard()?;

    let err = deployment
        .manager
        .resolve("webhdfs://nn-a/", &FileSystemOptions::new())
        .unwrap_err();
    assert!(matches!(err, ClusterVfsError::UnknownScheme(_)));
    Ok(())
}

#[tokio::test]
async fn test_capabilities_are_fixed() -> Result<()> {
    let deployment = Deployment::standard()?;
    let options = FileSystemOptions::new();

    let (hdfs, _) = deployment.manager.resolve("hdfs://nn-a/", &options)?;
    let (mapr, _) = deployment.manager.resolve("maprfs://mapr-nn:7222/", &options)?;
    assert_eq!(hdfs.capabilities(), &HDFS_CAPABILITIES);
    assert_eq!(mapr.capabilities(), &HDFS_CAPABILITIES);
    assert!(mapr.cluster().mapr);

    // Folder modification times are read-only
    hdfs.create_folder("/dir").await?;
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let err = hdfs.set_last_modified("/dir", time).await.unwrap_err();
    assert!(matches!(
        err,
        ClusterVfsError::NotSupported(Capability::SetLastModifiedFolder)
    ));

    hdfs.write("/dir/file", b"x", false).await?;
    hdfs.set_last_modified("/dir/file", time).await?;
    assert_eq!(hdfs.last_modified("/dir/file").await?, time);
    Ok(())
}
