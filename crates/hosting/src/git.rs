//! Generic git transport.
//!
//! Publishes a single file to any git remote without going through a
//! hosting API: clone into a scratch directory, write, commit, push.

use crate::client::HostClient;
use crate::repo::Repo;
use async_trait::async_trait;
use std::path::Path;
use tapforge_core::{CommitAuthor, Error, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Host-agnostic git client committing over the plain git protocol.
///
/// This transport cannot open pull requests and has no release downloads;
/// it only supports the single-file commit path.
#[derive(Debug, Clone)]
pub struct GitTransportClient {
    url: String,
    branch: String,
    private_key: String,
}

impl GitTransportClient {
    /// Creates a transport for the given remote URL and branch.
    ///
    /// An empty branch means the remote's default branch.
    #[must_use]
    pub fn new(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
            private_key: String::new(),
        }
    }

    /// Sets the SSH private key used to authenticate against the remote.
    #[must_use]
    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = key.into();
        self
    }

    /// The SSH invocation git uses when a private key is provided.
    fn ssh_command(key_path: &Path) -> String {
        format!(
            "ssh -i {} -o StrictHostKeyChecking=accept-new -F /dev/null",
            key_path.display()
        )
    }

    async fn git(args: &[&str], dir: &Path) -> Result<String> {
        Self::git_with_env(args, dir, &[]).await
    }

    async fn git_with_env(args: &[&str], dir: &Path, envs: &[(&str, String)]) -> Result<String> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| Error::git(format!("failed to run git {}: {e}", args.join(" "))))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl HostClient for GitTransportClient {
    async fn create_file(
        &self,
        author: &CommitAuthor,
        repo: &Repo,
        content: &[u8],
        path: &str,
        message: &str,
    ) -> Result<()> {
        let scratch = tempfile::tempdir()?;

        // The key lives next to the clone, never inside it.
        let mut envs: Vec<(&str, String)> = Vec::new();
        if !self.private_key.is_empty() {
            let key_path = scratch.path().join("id_ssh");
            tokio::fs::write(&key_path, format!("{}\n", self.private_key.trim()))
                .await
                .map_err(|e| {
                    Error::io_with_source(
                        "failed to stage git private key",
                        Some(key_path.clone()),
                        e,
                    )
                })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(&key_path, std::fs::Permissions::from_mode(0o600))
                    .await
                    .map_err(|e| {
                        Error::io_with_source(
                            "failed to restrict git private key",
                            Some(key_path.clone()),
                            e,
                        )
                    })?;
            }
            envs.push(("GIT_SSH_COMMAND", Self::ssh_command(&key_path)));
        }

        let dir = scratch.path().join("repo");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io_with_source("failed to create clone dir", Some(dir.clone()), e))?;

        Self::git_with_env(&["clone", "--depth", "1", &self.url, "."], &dir, &envs).await?;

        let branch = if self.branch.is_empty() {
            repo.branch.as_str()
        } else {
            self.branch.as_str()
        };
        if !branch.is_empty() {
            // Reuse the branch when it exists, create it otherwise.
            if Self::git(&["checkout", branch], &dir).await.is_err() {
                Self::git(&["checkout", "-B", branch], &dir).await?;
            }
        }

        let dest = dir.join(path);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::io_with_source(
                    format!("failed to create {}: {e}", parent.display()),
                    Some(parent.to_path_buf()),
                    e,
                )
            })?;
        }
        tokio::fs::write(&dest, content).await.map_err(|e| {
            Error::io_with_source(
                format!("failed to write {path}: {e}"),
                Some(dest.clone()),
                e,
            )
        })?;

        Self::git(&["add", path], &dir).await?;
        Self::git(
            &[
                "-c",
                &format!("user.name={}", author.name),
                "-c",
                &format!("user.email={}", author.email),
                "commit",
                "-m",
                message,
            ],
            &dir,
        )
        .await?;

        let refspec = if branch.is_empty() {
            "HEAD".to_string()
        } else {
            format!("HEAD:refs/heads/{branch}")
        };
        Self::git_with_env(&["push", "origin", &refspec], &dir, &envs).await?;

        info!(url = %self.url, path = %path, "file pushed over git transport");
        Ok(())
    }

    fn release_url_template(&self) -> Result<String> {
        Err(Error::host(
            "generic git transport has no release download URL template",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapforge_core::CommitAuthor;

    fn author() -> CommitAuthor {
        CommitAuthor::default()
    }

    async fn init_bare_remote(dir: &Path) -> std::path::PathBuf {
        let remote = dir.join("remote.git");
        tokio::fs::create_dir_all(&remote).await.unwrap();
        GitTransportClient::git(&["init", "--bare", "-b", "main"], &remote)
            .await
            .unwrap();

        // Seed the remote with an initial commit so clones succeed.
        let seed = dir.join("seed");
        tokio::fs::create_dir_all(&seed).await.unwrap();
        GitTransportClient::git(&["clone", remote.to_str().unwrap(), "."], &seed)
            .await
            .unwrap();
        tokio::fs::write(seed.join("README.md"), "# tap\n").await.unwrap();
        GitTransportClient::git(&["add", "README.md"], &seed).await.unwrap();
        GitTransportClient::git(
            &[
                "-c",
                "user.name=seed",
                "-c",
                "user.email=seed@example.com",
                "commit",
                "-m",
                "seed",
            ],
            &seed,
        )
        .await
        .unwrap();
        GitTransportClient::git(&["push", "origin", "HEAD:refs/heads/main"], &seed)
            .await
            .unwrap();
        remote
    }

    #[test]
    fn test_ssh_command_points_at_key() {
        let cmd = GitTransportClient::ssh_command(Path::new("/tmp/scratch/id_ssh"));
        assert!(cmd.starts_with("ssh -i /tmp/scratch/id_ssh"));
        assert!(cmd.contains("StrictHostKeyChecking=accept-new"));
    }

    #[tokio::test]
    async fn test_release_url_template_unsupported() {
        let client = GitTransportClient::new("ssh://git@example.com/acme/tap.git", "main");
        assert!(client.release_url_template().is_err());
    }

    #[tokio::test]
    async fn test_no_pull_request_capability() {
        let client = GitTransportClient::new("ssh://git@example.com/acme/tap.git", "");
        assert!(client.pull_request_opener().is_none());
    }

    #[tokio::test]
    async fn test_commit_single_file_to_local_remote() {
        let temp = tempfile::tempdir().unwrap();
        let remote = init_bare_remote(temp.path()).await;

        let client = GitTransportClient::new(remote.to_str().unwrap(), "main");
        let repo = Repo {
            owner: String::new(),
            name: "tap".to_string(),
            branch: "main".to_string(),
        };
        client
            .create_file(
                &author(),
                &repo,
                b"class Tool < Formula\nend\n",
                "Formula/tool.rb",
                "Brew formula update for tool",
            )
            .await
            .unwrap();

        // Clone again and verify the file arrived.
        let check = temp.path().join("check");
        tokio::fs::create_dir_all(&check).await.unwrap();
        GitTransportClient::git(&["clone", remote.to_str().unwrap(), "."], &check)
            .await
            .unwrap();
        let formula = tokio::fs::read_to_string(check.join("Formula/tool.rb"))
            .await
            .unwrap();
        assert!(formula.contains("class Tool < Formula"));
    }
}
