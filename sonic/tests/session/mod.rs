use std::time::Duration;

use sonic::prelude::*;

use crate::{focus, grid, init_tracing};

fn latency(ms: u64) -> Audit {
    Audit::new(AuditOption {
        latency: Some(Duration::from_millis(ms)),
        ..Default::default()
    })
}

#[tokio::test]
async fn disconnected_link() -> anyhow::Result<()> {
    init_tracing();

    let mut session = ArraySession::builder(grid(4, 4)?)
        .open(Audit::new(AuditOption {
            fail_on_open: true,
            ..Default::default()
        }))
        .await?;
    assert!(session.link_error().is_some());

    let snapshot = session.compute([focus(0., 0., 0.15)])?;
    assert_eq!(16, snapshot.excitations().len());

    let err = session.send([focus(0., 0., 0.15)]).await.unwrap_err();
    assert_eq!(ErrorKind::HardwareLink, err.kind());
    assert_eq!(
        SonicError::HardwareLink(LinkError::new("No device found")),
        err
    );

    let excitations = session.excitations().unwrap_or_default();
    assert_eq!(16, excitations.len());
    assert!(excitations.iter().all(|e| e.amplitude() <= 1.));
    assert_eq!(Some(2), session.inspector().generation());
    Ok(())
}

#[tokio::test]
async fn submit_and_flush() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(4, 4)?)
        .open(Audit::new(AuditOption::default()))
        .await?;

    let snapshot = session.submit([focus(0., 0., 0.15)])?;
    session.flush().await?;
    assert!(!session.is_pushing());
    assert_eq!(Some(&snapshot.frame()), session.link().await.last_frame());

    session.flush().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn newest_request_supersedes_pending_push() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(4, 4)?).open(latency(10)).await?;

    session.submit([focus(0., 0., 0.15)])?;
    session.submit([focus(0.01, 0., 0.15)])?;
    let last = session.submit([focus(0.02, 0., 0.15)])?;
    assert!(session.is_pushing());
    session.flush().await?;

    let link = session.link().await;
    assert_eq!(1, link.frames().len());
    assert_eq!(Some(&last.frame()), link.last_frame());
    assert_eq!(3, link.frames()[0].header().generation());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn newest_request_aborts_push_in_transit() -> anyhow::Result<()> {
    init_tracing();

    let mut session = ArraySession::builder(grid(4, 4)?).open(latency(10)).await?;

    session.submit([focus(0., 0., 0.15)])?;
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(session.is_pushing());

    let last = session.submit([focus(0.02, 0., 0.15)])?;
    session.flush().await?;

    let link = session.link().await;
    assert_eq!(1, link.frames().len());
    assert_eq!(2, last.generation());
    assert_eq!(Some(&last.frame()), link.last_frame());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn send_supersedes_submit() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(2, 2)?).open(latency(10)).await?;

    session.submit([focus(0., 0., 0.15)])?;
    session.send([focus(0.01, 0., 0.15)]).await?;
    session.flush().await?;

    let link = session.link().await;
    assert_eq!(1, link.frames().len());
    assert_eq!(2, link.frames()[0].header().generation());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_compute_keeps_push_in_flight() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(2, 2)?).open(latency(10)).await?;

    session.submit([focus(0., 0., 0.15)])?;
    let err = session.submit(Vec::new()).unwrap_err();
    assert_eq!(ErrorKind::Configuration, err.kind());
    session.flush().await?;

    assert_eq!(1, session.link().await.frames().len());
    assert_eq!(Some(1), session.snapshot().map(|s| s.generation()));
    Ok(())
}

#[tokio::test]
async fn submitted_push_reports_link_error() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(2, 2)?)
        .open(Audit::new(AuditOption {
            broken: true,
            ..Default::default()
        }))
        .await?;

    session.submit([focus(0., 0., 0.15)])?;
    assert_eq!(
        Err(SonicError::HardwareLink(LinkError::new("broken"))),
        session.flush().await
    );
    assert!(session.snapshot().is_some());
    Ok(())
}

#[tokio::test]
async fn inspector_outlives_session() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(2, 2)?)
        .open(Audit::new(AuditOption::default()))
        .await?;
    let inspector = session.inspector();

    session.send([focus(0., 0., 0.15)]).await?;
    session.close().await?;

    let handle = std::thread::spawn(move || inspector.excitations());
    let excitations = handle
        .join()
        .map_err(|_| anyhow::anyhow!("inspector thread panicked"))?;
    assert_eq!(4, excitations.map_or(0, |e| e.len()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_readers() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(4, 4)?)
        .open(Audit::new(AuditOption::default()))
        .await?;

    let readers = (0..4)
        .map(|_| {
            let inspector = session.inspector();
            std::thread::spawn(move || {
                (0..100).all(|_| {
                    inspector
                        .latest()
                        .is_none_or(|s| s.excitations().len() == 16 && s.normalized().len() == 16)
                })
            })
        })
        .collect::<Vec<_>>();

    for x in [0., 0.01, 0.02, 0.03] {
        session.submit([focus(x, 0., 0.15)])?;
    }
    session.flush().await?;

    readers.into_iter().try_for_each(|h| {
        let ok = h
            .join()
            .map_err(|_| anyhow::anyhow!("reader thread panicked"))?;
        anyhow::ensure!(ok);
        Ok(())
    })?;
    assert_eq!(Some(4), session.inspector().generation());
    Ok(())
}
