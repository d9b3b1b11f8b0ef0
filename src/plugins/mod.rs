pub mod cron;
pub mod telegram;

use std::sync::Arc;

use tokio::time::sleep;

use crate::{prelude::*, state::AppState};

const RESTART_DELAY: Duration = Duration::from_secs(5);

/// Long-running service supervised by [`App`]
#[async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  /// Spawns every plugin and restarts the ones that stop
  pub async fn run(self, app: Arc<AppState>) {
    for plugin in self.plugins {
      let app = app.clone();

      tokio::spawn(async move {
        let name = plugin.name();
        info!("SYSTEM: Service `{name}` initialized");

        loop {
          let app = app.clone();
          let plugin = plugin.clone();

          match tokio::spawn(async move { plugin.start(app).await }).await {
            Ok(Ok(())) => warn!("Service `{name}` stopped unexpectedly"),
            Ok(Err(err)) => error!("Service `{name}` crashed: {err:#}"),
            Err(err) if err.is_cancelled() => {
              info!("Service `{name}` shutdown");
              break;
            }
            Err(_) => error!("Service `{name}` PANICKED!"),
          }

          sleep(RESTART_DELAY).await;
          info!("SYSTEM: Restarting service `{name}`...");
        }
      });
    }
  }
}
