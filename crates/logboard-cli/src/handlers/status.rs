//! Board status command handlers.

use std::time::Duration;

use anyhow::Result;
use logboard_core::{
    BoardId, BoardStatus, DeliveryScope, FolderStatusView, StatusCounts, StatusNotification,
};
use tracing::info;

use crate::bootstrap::CliContext;
use crate::handlers::interrupted;
use crate::presentation::{format_badge, print_separator};
use crate::status_commands::StatusCommand;

/// Dispatch a status subcommand.
pub async fn execute(ctx: &CliContext, command: StatusCommand) -> Result<()> {
    match command {
        StatusCommand::Get { board } => get(ctx, board).await,
        StatusCommand::Set { board, status } => set(ctx, board, status).await,
        StatusCommand::Apply { board, label } => apply(ctx, board, &label).await,
        StatusCommand::Toggle { board } => toggle(ctx, board).await,
        StatusCommand::Watch {
            boards,
            duration_secs,
        } => watch(ctx, &boards, duration_secs.map(Duration::from_secs)).await,
    }
}

pub async fn get(ctx: &CliContext, board: BoardId) -> Result<()> {
    let status = ctx.status.status(board).await;
    println!("{}", status_line(board, status));
    Ok(())
}

pub async fn set(ctx: &CliContext, board: BoardId, status: BoardStatus) -> Result<()> {
    ctx.status.set_status(board, status).await;
    println!("{}", status_line(board, status));
    Ok(())
}

pub async fn apply(ctx: &CliContext, board: BoardId, label: &str) -> Result<()> {
    let status = ctx.status.apply_server_status(board, label).await;
    println!("{}", status_line(board, status));
    Ok(())
}

pub async fn toggle(ctx: &CliContext, board: BoardId) -> Result<()> {
    let status = ctx.status.toggle_status(board).await;
    println!("{}", status_line(board, status));
    Ok(())
}

/// Print status changes until interrupted.
///
/// With no boards every notification is printed. With boards, they are
/// summarized as a folder and the summary is reprinted whenever it changes.
pub async fn watch(ctx: &CliContext, boards: &[BoardId], limit: Option<Duration>) -> Result<()> {
    let mut subscription = ctx.status.subscribe();
    let mut folder = if boards.is_empty() {
        None
    } else {
        let view = FolderStatusView::load(ctx.status.clone(), boards.iter().copied()).await;
        print_folder(&view);
        Some(view)
    };

    info!(boards = boards.len(), "Watching board statuses");
    let stop = interrupted(limit);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            () = &mut stop => break,
            notification = subscription.recv() => {
                let Some(notification) = notification else {
                    break;
                };
                match folder.as_mut() {
                    Some(view) => {
                        if view.apply(&notification).await {
                            println!("{}", notification_line(&notification));
                            print_folder(view);
                        }
                    }
                    None => println!("{}", notification_line(&notification)),
                }
            }
        }
    }
    Ok(())
}

fn status_line(board: BoardId, status: BoardStatus) -> String {
    format!("board {board}: {status} ({})", status.badge().label)
}

fn notification_line(notification: &StatusNotification) -> String {
    let origin = match notification.scope {
        DeliveryScope::Local => "local",
        DeliveryScope::CrossContext => "remote",
    };
    format!(
        "[{origin}] {}",
        status_line(notification.board_id, notification.status)
    )
}

fn counts_line(counts: StatusCounts) -> String {
    format!(
        "{} boards: {} collecting, {} unresponsive, {} not configured",
        counts.total(),
        counts.collecting,
        counts.unresponsive,
        counts.before
    )
}

fn print_folder(view: &FolderStatusView) {
    for (board, badge) in view.badges() {
        println!("{}", format_badge(board, badge));
    }
    println!("{}", counts_line(view.counts()));
    print_separator(40);
}
