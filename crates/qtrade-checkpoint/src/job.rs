/// One named snapshot write, enqueued from the session thread and applied
/// on the checkpoint worker thread.
pub struct CheckpointJob {
    pub name: String,
    pub payload: Vec<u8>,
}
