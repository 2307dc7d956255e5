pub type CmdResult<T> = item_tracker_release::Result<(T, i32)>;

pub mod release;

/// Run the release command and map its result to JSON.
pub(crate) fn run_json(
    args: release::ReleaseArgs,
) -> (item_tracker_release::Result<serde_json::Value>, i32) {
    item_tracker_release::output::map_cmd_result_to_json(release::run(args))
}
