//! Status - オフラインインジケータの表示モデル
//!
//! キュー本体は UI を持たない。表示側はこのスナップショットから描画する。

use serde::Serialize;

/// QueueStatus はある瞬間のキューの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub online: bool,
    pub pending: usize,
    /// flush pass が実行中
    pub syncing: bool,
}

/// インジケータに何を出すか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "indicator", rename_all = "snake_case")]
pub enum Indicator {
    /// オフライン（N 件保留中）
    Offline { pending: usize },
    /// 同期中 / 同期待ち（N 件）
    Syncing { pending: usize },
    /// 非表示
    Hidden,
}

impl QueueStatus {
    /// # 表示ルール
    /// - オフラインなら件数つきで常に表示
    /// - オンラインで保留があれば「同期中」
    /// - それ以外は非表示
    pub fn indicator(&self) -> Indicator {
        if !self.online {
            Indicator::Offline {
                pending: self.pending,
            }
        } else if self.pending > 0 {
            Indicator::Syncing {
                pending: self.pending,
            }
        } else {
            Indicator::Hidden
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Indicator::Offline { pending } => write!(f, "offline ({pending} pending orders)"),
            Indicator::Syncing { pending } => write!(f, "syncing... ({pending} orders)"),
            Indicator::Hidden => write!(f, "online, nothing pending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::offline_empty(false, 0, false, Indicator::Offline { pending: 0 })]
    #[case::offline_pending(false, 3, false, Indicator::Offline { pending: 3 })]
    #[case::online_pending(true, 2, false, Indicator::Syncing { pending: 2 })]
    #[case::online_syncing(true, 2, true, Indicator::Syncing { pending: 2 })]
    #[case::online_empty(true, 0, false, Indicator::Hidden)]
    fn indicator_rules(
        #[case] online: bool,
        #[case] pending: usize,
        #[case] syncing: bool,
        #[case] expected: Indicator,
    ) {
        let status = QueueStatus {
            online,
            pending,
            syncing,
        };
        assert_eq!(status.indicator(), expected);
    }

    #[test]
    fn indicator_text() {
        assert_eq!(
            Indicator::Offline { pending: 2 }.to_string(),
            "offline (2 pending orders)"
        );
    }
}
