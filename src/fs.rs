use async_trait::async_trait;

/// An object that can be used to get and put blobs.
#[async_trait]
pub trait BlobStorageProvider {
    type Error: std::error::Error + Send;
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, Self::Error>;
    async fn put(&self, blob_name: &str, contents: Vec<u8>) -> Result<Vec<u8>, Self::Error>;
}

/// A [`BlobStorageProvider`] over the local disk, rooted at the working
/// directory. Used to cache third-party geocoding responses between runs.
pub struct LocalDisk;

#[async_trait]
impl BlobStorageProvider for LocalDisk {
    type Error = std::io::Error;

    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        if std::path::Path::new(blob_name).try_exists()? {
            Ok(Some(std::fs::read(blob_name)?))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, blob_name: &str, contents: Vec<u8>) -> Result<Vec<u8>, Self::Error> {
        let mut dir: std::path::PathBuf = blob_name.into();
        dir.pop();
        std::fs::create_dir_all(dir)?;
        std::fs::write(blob_name, &contents)?;
        Ok(contents)
    }
}

/// Tries to retrieve `blob_name` from `provider`. If it does not exist,
/// runs `fetch` and writes the result into `provider`.
/// Returns the data in `blob_name` from `provider`.
/// # Implementation
/// This function is idempotent but not pure.
pub async fn cached<F>(
    blob_name: &str,
    fetch: F,
    provider: &impl BlobStorageProvider<Error = std::io::Error>,
) -> Result<Vec<u8>, std::io::Error>
where
    F: futures::Future<Output = Result<Vec<u8>, std::io::Error>>,
{
    if let Some(data) = provider.maybe_get(blob_name).await? {
        log::info!("{blob_name} - cache hit");
        Ok(data)
    } else {
        log::info!("{blob_name} - cache miss");
        let contents = fetch.await?;
        let data = provider.put(blob_name, contents).await?;
        log::info!("{blob_name} - cache write");
        Ok(data)
    }
}
