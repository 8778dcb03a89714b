use crate::domain::model::{Allocation, Document, Row, SplitGroup, SplitSpec};

pub const ACCOUNT_COLUMN: &str = "account";
pub const SENT_COLUMN: &str = "sent";
pub const REMAINDER_SUFFIX: &str = "_remainder";

struct TaggedColumns {
    headers: Vec<String>,
    account_pos: usize,
    sent_pos: usize,
}

/// 依 spec 順序將資料列切成連續區段：明確配額取 min(quota, 剩餘)，
/// 未指定配額的分組均分扣除保留量後的剩餘列；全部配額明確且有剩餘時，
/// 剩餘列掛在最後一個分組底下成為 remainder 分組。
pub fn allocate(document: &Document, specs: &[SplitSpec]) -> Allocation {
    let columns = tag_columns(&document.headers);

    if specs.is_empty() {
        return Allocation {
            headers: columns.headers,
            groups: Vec::new(),
        };
    }

    let mut groups: Vec<SplitGroup> = Vec::with_capacity(specs.len() + 1);
    let mut remaining: &[Row] = &document.rows;

    // 尚未輪到的明確配額總和，以及還沒分到列的未指定配額分組數
    let mut reserved_ahead: usize = specs.iter().filter_map(SplitSpec::explicit_quota).sum();
    let mut open_left: usize = specs
        .iter()
        .filter(|spec| spec.explicit_quota().is_none())
        .count();

    for spec in specs {
        let take = match spec.explicit_quota() {
            Some(quota) => {
                reserved_ahead -= quota;
                quota.min(remaining.len())
            }
            None => {
                // 均分時扣掉後面明確配額保留的列數；最後一個未指定分組吸收零頭
                let pool = remaining.len().saturating_sub(reserved_ahead);
                let share = pool.div_ceil(open_left);
                open_left -= 1;
                share
            }
        };

        let (claimed, rest) = remaining.split_at(take);
        remaining = rest;

        let key = spec.group_key();
        tracing::debug!("Allocated {} rows to group '{}'", claimed.len(), key);
        groups.push(build_group(key, &spec.name, &spec.label, claimed, &columns));
    }

    if !remaining.is_empty() {
        if let Some(last) = specs.last() {
            let key = format!("{}{}", last.group_key(), REMAINDER_SUFFIX);
            let sent = format!("{}{}", last.label, REMAINDER_SUFFIX);
            tracing::debug!(
                "Allocated {} leftover rows to remainder group '{}'",
                remaining.len(),
                key
            );
            groups.push(build_group(key, &last.name, &sent, remaining, &columns));
        }
    }

    Allocation {
        headers: columns.headers,
        groups,
    }
}

// account/sent 欄已存在時沿用原位置覆寫，否則附加在最後
fn tag_columns(input_headers: &[String]) -> TaggedColumns {
    let mut headers = input_headers.to_vec();

    let account_pos = match headers.iter().position(|h| h == ACCOUNT_COLUMN) {
        Some(pos) => pos,
        None => {
            headers.push(ACCOUNT_COLUMN.to_string());
            headers.len() - 1
        }
    };

    let sent_pos = match headers.iter().position(|h| h == SENT_COLUMN) {
        Some(pos) => pos,
        None => {
            headers.push(SENT_COLUMN.to_string());
            headers.len() - 1
        }
    };

    TaggedColumns {
        headers,
        account_pos,
        sent_pos,
    }
}

fn build_group(
    key: String,
    account: &str,
    sent: &str,
    rows: &[Row],
    columns: &TaggedColumns,
) -> SplitGroup {
    let rows = rows
        .iter()
        .map(|row| tag_row(row, account, sent, columns))
        .collect();

    SplitGroup {
        key,
        account: account.to_string(),
        sent: sent.to_string(),
        rows,
    }
}

fn tag_row(row: &Row, account: &str, sent: &str, columns: &TaggedColumns) -> Row {
    let mut tagged = row.clone();
    tagged.resize(columns.headers.len(), String::new());
    tagged[columns.account_pos] = account.to_string();
    tagged[columns.sent_pos] = sent.to_string();
    tagged
}
