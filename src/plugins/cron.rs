use std::sync::Arc;

use tokio::time::{MissedTickBehavior, interval};

use crate::{prelude::*, state::AppState};

const GC_PERIOD: Duration = Duration::from_secs(60);

/// Drops conversations abandoned for longer than the configured TTL
pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  fn name(&self) -> &'static str {
    "session-gc"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut ticker = interval(GC_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      ticker.tick().await;
      app.gc_sessions();
    }
  }
}
