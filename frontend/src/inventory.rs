//! 物品清单服务

use myhome_shared::protocol::{DeleteItemRequest, ListItemsRequest};
use myhome_shared::{Item, NewItem};

use crate::api::{ApiClient, ApiError};

/// 房间筛选中表示"全部"的选项
pub const ALL_ROOMS: &str = "All";

pub const NAME_FIELD: &str = "item-name";
pub const ROOM_FIELD: &str = "item-room";

pub struct Inventory {
    api: ApiClient,
}

impl Inventory {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 当前家庭的全部物品，新添加的在前
    pub async fn get_all(&self) -> Result<Vec<Item>, ApiError> {
        Ok(self.api.send(&ListItemsRequest).await?.items)
    }

    pub async fn add(&self, item: NewItem) -> Result<Item, ApiError> {
        let item = validate(item)?;
        let created = self.api.send(&item).await?.item;
        log_info!("[Inventory] Added {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .send(&DeleteItemRequest { id: id.to_string() })
            .await?;
        Ok(())
    }
}

fn validate(mut item: NewItem) -> Result<NewItem, ApiError> {
    item.name = item.name.trim().to_string();
    item.room = item.room.trim().to_string();
    item.notes = item.notes.trim().to_string();
    item.category = item
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    if item.name.is_empty() {
        return Err(ApiError::validation(NAME_FIELD, "请输入物品名称"));
    }
    if item.room.is_empty() {
        return Err(ApiError::validation(ROOM_FIELD, "请选择所在房间"));
    }
    Ok(item)
}

/// 筛选项：`All` 加上按字母排序去重后的房间
pub fn rooms(items: &[Item]) -> Vec<String> {
    let mut rooms: Vec<String> = items
        .iter()
        .map(|i| i.room.clone())
        .filter(|r| !r.is_empty())
        .collect();
    rooms.sort();
    rooms.dedup();
    rooms.insert(0, ALL_ROOMS.to_string());
    rooms
}

pub fn filter_by_room<'a>(items: &'a [Item], room: &str) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|i| room == ALL_ROOMS || i.room == room)
        .collect()
}
