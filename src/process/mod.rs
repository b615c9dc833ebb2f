pub mod handle;
pub mod restart;
pub mod spawner;
pub mod supervisor;

pub use handle::ProcessHandle;
pub use restart::{Backoff, RestartPolicy};
pub use spawner::spawn_worker;
pub use supervisor::ProcessSupervisor;
